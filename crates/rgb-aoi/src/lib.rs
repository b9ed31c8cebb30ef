//! RGB Area of Interest
//!
//! Tracks 2D positions for opaque handles and maintains, per handle, the set
//! of other handles within a neighbor radius.
//!
//! The [`AoiIndex`] trait is the contract a space talks to. [`TowerAoi`] is
//! the default implementation: the world is bucketed into square towers of
//! `radius` size, so a neighbor search only ever touches the 3x3 block of
//! towers around a handle.
//!
//! # Example
//!
//! ```ignore
//! let mut aoi = TowerAoi::new(AoiBounds::new(-1000.0, 1000.0, -1000.0, 1000.0), 100.0);
//!
//! aoi.enter(AoiHandle(1), 0.0, 0.0);
//! let events = aoi.enter(AoiHandle(2), 50.0, 0.0);
//! // both handles now see each other
//! assert_eq!(events.len(), 2);
//! ```

pub mod index;
pub mod tower;

pub use index::{AoiBounds, AoiEvent, AoiEvents, AoiHandle, AoiIndex};
pub use tower::{Tower, TowerAoi, TowerId};
