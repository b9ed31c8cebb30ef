//! Spaces: entities that contain other entities.
//!
//! A space owns the set of ids it contains and, optionally, a spatial index.
//! Containment operations live on [`World`](crate::World) because they touch
//! entity records and client links as well as the space itself.

use std::fmt;

use hashbrown::HashSet;
use rgb_aoi::{AoiEvents, AoiIndex};

use crate::entity::EntityId;
use crate::hooks::SpaceHooks;

/// Entity type name of every space.
pub const SPACE_ENTITY_TYPE: &str = "__space__";

/// Attribute holding the space kind.
pub const SPACE_KIND_ATTR_KEY: &str = "_K";

/// Kind of the nil space.
pub const NIL_SPACE_KIND: i32 = 0;

/// Containment state of a space.
pub struct Space {
    id: EntityId,
    kind: i32,
    entities: HashSet<EntityId>,
    aoi: Option<Box<dyn AoiIndex>>,
    pub(crate) hooks: SpaceHooks,
}

impl Space {
    /// Create a space with an empty entity set and no spatial index.
    #[must_use]
    pub fn new(id: EntityId, kind: i32, hooks: SpaceHooks) -> Self {
        Self {
            id,
            kind,
            entities: HashSet::new(),
            aoi: None,
            hooks,
        }
    }

    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> i32 {
        self.kind
    }

    /// Check if this is the nil space.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.kind == NIL_SPACE_KIND
    }

    /// Check if `entity` is in this space's entity set.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Total count of entities in the space.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Snapshot of the contained ids, safe to iterate while mutating the space.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.iter().copied().collect()
    }

    #[must_use]
    pub fn has_aoi(&self) -> bool {
        self.aoi.is_some()
    }

    /// The spatial index, if configured.
    #[must_use]
    pub fn aoi(&self) -> Option<&dyn AoiIndex> {
        self.aoi.as_deref()
    }

    /// Install the spatial index. The caller checks the one-shot rules.
    pub(crate) fn set_aoi(&mut self, aoi: Box<dyn AoiIndex>) {
        self.aoi = Some(aoi);
    }

    pub(crate) fn aoi_mut(&mut self) -> Option<&mut (dyn AoiIndex + 'static)> {
        self.aoi.as_deref_mut()
    }

    pub(crate) fn insert(&mut self, entity: EntityId) -> bool {
        self.entities.insert(entity)
    }

    pub(crate) fn remove(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity)
    }

    /// Forward an enter to the index, if any.
    pub(crate) fn aoi_enter(&mut self, entity: EntityId, x: f32, y: f32) -> AoiEvents {
        self.aoi_mut()
            .map(|aoi| aoi.enter(entity.aoi_handle(), x, y))
            .unwrap_or_default()
    }

    pub(crate) fn aoi_leave(&mut self, entity: EntityId) -> AoiEvents {
        self.aoi_mut()
            .map(|aoi| aoi.leave(entity.aoi_handle()))
            .unwrap_or_default()
    }

    pub(crate) fn aoi_moved(&mut self, entity: EntityId, x: f32, y: f32) -> AoiEvents {
        self.aoi_mut()
            .map(|aoi| aoi.moved(entity.aoi_handle(), x, y))
            .unwrap_or_default()
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "Space<nil>")
        } else {
            write!(f, "Space<{}|{}>", self.kind, self.id)
        }
    }
}

impl fmt::Debug for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Space")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("entities", &self.entities.len())
            .field("aoi", &self.aoi.is_some())
            .finish_non_exhaustive()
    }
}
