//! The spatial index contract.

use std::fmt;

use smallvec::SmallVec;

/// Opaque token identifying a tracked object inside an index.
///
/// The index never interprets the value; callers pick it (usually the raw
/// entity id) and thread it through `enter`, `moved` and `leave`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AoiHandle(pub u64);

impl AoiHandle {
    /// Get the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AoiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AoiHandle({})", self.0)
    }
}

/// A neighbor-visibility change produced by an index mutation.
///
/// Events are directional: `watcher` gained or lost sight of `target`.
/// Two handles becoming neighbors produce two events, one per direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AoiEvent {
    /// `target` came within the neighbor radius of `watcher`.
    Enter { watcher: AoiHandle, target: AoiHandle },
    /// `target` is no longer within the neighbor radius of `watcher`.
    Leave { watcher: AoiHandle, target: AoiHandle },
}

impl AoiEvent {
    /// The handle whose view changed.
    #[must_use]
    pub const fn watcher(&self) -> AoiHandle {
        match *self {
            Self::Enter { watcher, .. } | Self::Leave { watcher, .. } => watcher,
        }
    }

    /// The handle that appeared or disappeared.
    #[must_use]
    pub const fn target(&self) -> AoiHandle {
        match *self {
            Self::Enter { target, .. } | Self::Leave { target, .. } => target,
        }
    }
}

/// Events returned from a single index call.
pub type AoiEvents = SmallVec<[AoiEvent; 8]>;

/// Axis-aligned bounding rectangle of an index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AoiBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl AoiBounds {
    /// Create bounds from the two axis ranges.
    #[must_use]
    pub const fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Check that every edge is finite and neither axis is inverted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// Clamp a point into the bounds. NaN coordinates land on the minimum edge.
    #[must_use]
    #[allow(clippy::manual_clamp)] // f32::clamp panics on inverted bounds
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.max(self.min_x).min(self.max_x),
            y.max(self.min_y).min(self.max_y),
        )
    }

    /// Width along the x axis.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Height along the y axis.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// A proximity index over 2D positions.
///
/// Implementations must keep insert, update and remove sub-linear in the
/// tracked population. Every mutating call returns the visibility changes it
/// caused so the owner can replicate them to clients.
pub trait AoiIndex: Send {
    /// Start tracking `handle` at `(x, y)`.
    fn enter(&mut self, handle: AoiHandle, x: f32, y: f32) -> AoiEvents;

    /// Stop tracking `handle`. Unknown handles produce no events.
    fn leave(&mut self, handle: AoiHandle) -> AoiEvents;

    /// Update the position of a tracked handle.
    fn moved(&mut self, handle: AoiHandle, x: f32, y: f32) -> AoiEvents;

    /// Handles currently within the neighbor radius of `handle`.
    fn neighbors(&self, handle: AoiHandle) -> Vec<AoiHandle>;

    /// Number of tracked handles.
    fn len(&self) -> usize;

    /// Check if nothing is tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_clamp() {
        let bounds = AoiBounds::new(-10.0, 10.0, 0.0, 5.0);

        assert_eq!(bounds.clamp(20.0, -3.0), (10.0, 0.0));
        assert_eq!(bounds.clamp(1.5, 2.5), (1.5, 2.5));
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 5.0);
        assert_eq!(bounds.clamp(f32::NAN, 1.0), (-10.0, 1.0));
    }

    #[test]
    fn test_bounds_validity() {
        assert!(AoiBounds::new(-10.0, 10.0, 0.0, 0.0).is_valid());
        assert!(!AoiBounds::new(10.0, -10.0, 0.0, 5.0).is_valid());
        assert!(!AoiBounds::new(f32::NAN, 10.0, 0.0, 5.0).is_valid());
        assert!(!AoiBounds::new(-10.0, f32::INFINITY, 0.0, 5.0).is_valid());
    }

    #[test]
    fn test_event_accessors() {
        let event = AoiEvent::Leave {
            watcher: AoiHandle(1),
            target: AoiHandle(2),
        };

        assert_eq!(event.watcher(), AoiHandle(1));
        assert_eq!(event.target(), AoiHandle(2));
    }
}
