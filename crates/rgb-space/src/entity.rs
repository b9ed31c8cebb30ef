//! Entity identifiers and the containment record of an entity.
//!
//! An [`EntityRecord`] only carries what space containment touches:
//! the current space, position, client link, sync flags and AOI handle.
//! Spaces are referenced by id and resolved through the world registries,
//! never by pointer.

use std::fmt;

use bitflags::bitflags;
use hashbrown::HashMap;
use rgb_aoi::AoiHandle;
use serde::{Deserialize, Serialize};

use crate::hooks::EntityHooks;

/// A globally unique entity identifier.
///
/// Ids are never reused for the lifetime of a world, so a stale id can be
/// detected simply by failing to resolve it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The handle this entity is tracked under in a spatial index.
    #[must_use]
    pub const fn aoi_handle(self) -> AoiHandle {
        AoiHandle(self.0)
    }

    /// Inverse of [`EntityId::aoi_handle`].
    #[must_use]
    pub const fn from_aoi_handle(handle: AoiHandle) -> Self {
        Self(handle.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocator for entity IDs.
///
/// Hands out monotonically increasing ids. Ids supplied from outside
/// (loading, restoring) are reserved so they are never handed out again.
#[derive(Debug)]
pub struct EntityIdAllocator {
    next: u64,
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityIdAllocator {
    /// Create a new allocator. Id 0 is never allocated.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate a fresh id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Make sure `id` is never returned by [`EntityIdAllocator::allocate`].
    pub fn reserve(&mut self, id: EntityId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }
}

/// 3D position. Only `x` and `z` feed the spatial index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

bitflags! {
    /// Who receives updates about an entity.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SyncFlags: u8 {
        /// Send updates to the entity's own client.
        const OWN_CLIENT = 1 << 0;
        /// Send updates to the clients of neighboring entities.
        const NEIGHBOR_CLIENTS = 1 << 1;
    }
}

/// Identifier of a remote client connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Integer attributes replicated with an entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attrs {
    ints: HashMap<String, i64>,
}

impl Attrs {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an integer attribute, `0` if unset.
    #[must_use]
    pub fn get_int(&self, key: &str) -> i64 {
        self.ints.get(key).copied().unwrap_or(0)
    }

    /// Set an integer attribute.
    pub fn set_int(&mut self, key: &str, value: i64) {
        self.ints.insert(key.to_owned(), value);
    }
}

/// Per-entity state consumed and mutated by space containment.
pub struct EntityRecord {
    pub(crate) id: EntityId,
    pub(crate) type_name: String,
    pub(crate) position: Vector3,
    /// Always points at a space; the null space while unplaced.
    pub(crate) space: EntityId,
    pub(crate) client: Option<ClientId>,
    pub(crate) sync_flags: SyncFlags,
    /// `None` while untracked by any spatial index.
    pub(crate) aoi: Option<AoiHandle>,
    pub(crate) use_aoi: bool,
    pub(crate) attrs: Attrs,
    pub(crate) hooks: EntityHooks,
    /// Set once destruction starts; repeated destroys are no-ops.
    pub(crate) destroying: bool,
}

impl EntityRecord {
    pub(crate) fn new(
        id: EntityId,
        type_name: &str,
        space: EntityId,
        use_aoi: bool,
        hooks: EntityHooks,
    ) -> Self {
        Self {
            id,
            type_name: type_name.to_owned(),
            position: Vector3::default(),
            space,
            client: None,
            sync_flags: SyncFlags::empty(),
            aoi: None,
            use_aoi,
            attrs: Attrs::new(),
            hooks,
            destroying: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub const fn position(&self) -> Vector3 {
        self.position
    }

    /// The space currently containing this entity.
    #[must_use]
    pub const fn space(&self) -> EntityId {
        self.space
    }

    #[must_use]
    pub const fn client(&self) -> Option<ClientId> {
        self.client
    }

    #[must_use]
    pub const fn sync_flags(&self) -> SyncFlags {
        self.sync_flags
    }

    /// The spatial index handle, if tracked.
    #[must_use]
    pub const fn aoi_handle(&self) -> Option<AoiHandle> {
        self.aoi
    }

    /// Whether this entity takes part in spatial tracking.
    #[must_use]
    pub const fn use_aoi(&self) -> bool {
        self.use_aoi
    }

    #[must_use]
    pub const fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Attribute access for game code; containment reads only the space kind.
    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }
}

impl fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("position", &self.position)
            .field("space", &self.space)
            .field("client", &self.client)
            .field("sync_flags", &self.sync_flags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.type_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut allocator = EntityIdAllocator::new();

        let e1 = allocator.allocate();
        let e2 = allocator.allocate();

        assert_eq!(e1.raw(), 1);
        assert_eq!(e2.raw(), 2);
    }

    #[test]
    fn test_reserve_skips_loaded_ids() {
        let mut allocator = EntityIdAllocator::new();

        allocator.reserve(EntityId::new(41));
        assert_eq!(allocator.allocate(), EntityId::new(42));

        // Reserving below the watermark changes nothing
        allocator.reserve(EntityId::new(3));
        assert_eq!(allocator.allocate(), EntityId::new(43));
    }

    #[test]
    fn test_aoi_handle_roundtrip() {
        let id = EntityId::new(99);
        assert_eq!(EntityId::from_aoi_handle(id.aoi_handle()), id);
    }

    #[test]
    fn test_attrs_default_to_zero() {
        let mut attrs = Attrs::new();
        assert_eq!(attrs.get_int("_K"), 0);

        attrs.set_int("_K", 3);
        assert_eq!(attrs.get_int("_K"), 3);
    }
}
