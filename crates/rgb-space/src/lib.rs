//! RGB Spaces - containment and AOI synchronization
//!
//! Tracks which entity belongs to which space, keeps proximity-based
//! visibility between entities through a pluggable spatial index, and emits
//! client create/destroy notifications as entities move between and within
//! spaces.
//!
//! # Key Concepts
//!
//! - **Space**: an entity that contains other entities, optionally with a
//!   spatial index ([`rgb_aoi::AoiIndex`])
//! - **Nil space**: the single kind-0 space every unplaced entity sits in
//! - **Kind hooks**: per space kind / entity type overrides for lifecycle and
//!   containment events, always wrapped around fixed base bookkeeping
//! - **World**: the runtime context owning every registry
//!
//! # Example
//!
//! ```ignore
//! let outbox = ClientOutbox::new();
//! let mut world = World::new(WorldConfig::default()).with_client_sink(outbox.clone());
//! world.register_entity_type(EntityTypeDesc::new("Avatar"));
//!
//! world.create_nil_space()?;
//! let arena = world.create_space(1)?;
//! world.configure_aoi(arena, -1000.0, 1000.0, -1000.0, 1000.0, 100.0)?;
//!
//! let avatar = world.create_entity("Avatar", arena, Vector3::new(0.0, 0.0, 0.0))?;
//! world.move_entity(avatar, Vector3::new(50.0, 0.0, 0.0))?;
//! world.leave_space(arena, avatar)?;
//! ```

mod client;
mod config;
mod entity;
mod error;
mod hooks;
mod registry;
mod space;
mod world;

pub use client::{ClientOutbox, ClientSink, Notification, NullClientSink};
pub use config::WorldConfig;
pub use entity::{
    Attrs, ClientId, EntityId, EntityIdAllocator, EntityRecord, SyncFlags, Vector3,
};
pub use error::{SpaceError, SpaceResult};
pub use hooks::{
    ContainmentHook, EntityEvent, EntityHooks, EntityTypeDesc, HookFailure, LifecycleHook,
    SpaceEvent, SpaceHooks, SpaceKindDesc,
};
pub use registry::{EntityRegistry, SpaceRegistry, TypeRegistry};
pub use space::{NIL_SPACE_KIND, SPACE_ENTITY_TYPE, SPACE_KIND_ATTR_KEY, Space};
pub use world::{AoiFactory, World};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ClientId, ClientOutbox, EntityHooks, EntityId, EntityTypeDesc, SpaceError, SpaceHooks,
        SpaceKindDesc, Vector3, World, WorldConfig,
    };
}
