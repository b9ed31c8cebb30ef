//! Process-wide registries owned by the [`World`](crate::World).
//!
//! - [`EntityRegistry`]: every live entity record by id
//! - [`SpaceRegistry`]: every registered space by id
//! - [`TypeRegistry`]: entity type and space kind hook tables

use hashbrown::HashMap;
use tracing::debug;

use crate::entity::{EntityId, EntityRecord};
use crate::error::{SpaceError, SpaceResult};
use crate::hooks::{EntityTypeDesc, SpaceHooks, SpaceKindDesc};
use crate::space::Space;

/// Global entity lookup.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, EntityRecord>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, failing if the id is taken.
    pub fn insert(&mut self, record: EntityRecord) -> SpaceResult<()> {
        if self.entities.contains_key(&record.id) {
            return Err(SpaceError::DuplicateId(record.id));
        }
        self.entities.insert(record.id, record);
        Ok(())
    }

    pub fn remove(&mut self, id: EntityId) -> Option<EntityRecord> {
        self.entities.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.entities.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Mapping from space id to space.
#[derive(Debug, Default)]
pub struct SpaceRegistry {
    spaces: HashMap<EntityId, Space>,
}

impl SpaceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a space. Fails with [`SpaceError::DuplicateId`] if the id is
    /// already registered; the existing entry is left untouched.
    pub fn register(&mut self, id: EntityId, space: Space) -> SpaceResult<()> {
        if self.spaces.contains_key(&id) {
            return Err(SpaceError::DuplicateId(id));
        }
        debug!(space = %id, kind = space.kind(), "space registered");
        self.spaces.insert(id, space);
        Ok(())
    }

    /// Remove a space. Absent ids are ignored.
    pub fn unregister(&mut self, id: EntityId) -> Option<Space> {
        self.spaces.remove(&id)
    }

    #[must_use]
    pub fn lookup(&self, id: EntityId) -> Option<&Space> {
        self.spaces.get(&id)
    }

    pub fn lookup_mut(&mut self, id: EntityId) -> Option<&mut Space> {
        self.spaces.get_mut(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

/// Hook tables resolved at registration time.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entity_types: HashMap<String, EntityTypeDesc>,
    space_kinds: HashMap<i32, SpaceKindDesc>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an entity type.
    pub fn register_entity_type(&mut self, desc: EntityTypeDesc) {
        debug!(type_name = %desc.name, use_aoi = desc.use_aoi, "entity type registered");
        self.entity_types.insert(desc.name.clone(), desc);
    }

    /// Register a space kind. Kind 0 is reserved for the nil space and each
    /// kind may be registered once.
    pub fn register_space_kind(&mut self, desc: SpaceKindDesc) -> SpaceResult<()> {
        if desc.kind == 0 || self.space_kinds.contains_key(&desc.kind) {
            return Err(SpaceError::InvalidSpaceKind(desc.kind));
        }
        debug!(kind = desc.kind, "space kind registered");
        self.space_kinds.insert(desc.kind, desc);
        Ok(())
    }

    #[must_use]
    pub fn entity_type(&self, name: &str) -> Option<&EntityTypeDesc> {
        self.entity_types.get(name)
    }

    /// Hook table for a kind; unregistered kinds get the defaults.
    #[must_use]
    pub fn space_hooks(&self, kind: i32) -> SpaceHooks {
        self.space_kinds
            .get(&kind)
            .map(|desc| desc.hooks.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_registry_rejects_duplicates() {
        let mut registry = SpaceRegistry::new();
        let id = EntityId::new(5);

        registry.register(id, Space::new(id, 1, SpaceHooks::new())).unwrap();
        let err = registry
            .register(id, Space::new(id, 2, SpaceHooks::new()))
            .unwrap_err();

        assert_eq!(err, SpaceError::DuplicateId(id));
        // First registration survives
        assert_eq!(registry.lookup(id).unwrap().kind(), 1);
    }

    #[test]
    fn test_space_registry_unregister_is_idempotent() {
        let mut registry = SpaceRegistry::new();
        let id = EntityId::new(5);

        registry.register(id, Space::new(id, 1, SpaceHooks::new())).unwrap();
        assert!(registry.unregister(id).is_some());
        assert!(registry.unregister(id).is_none());
        assert!(registry.lookup(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_kind_zero_is_reserved() {
        let mut types = TypeRegistry::new();

        assert_eq!(
            types.register_space_kind(SpaceKindDesc::new(0, SpaceHooks::new())),
            Err(SpaceError::InvalidSpaceKind(0))
        );
        types
            .register_space_kind(SpaceKindDesc::new(3, SpaceHooks::new()))
            .unwrap();
        assert!(
            types
                .register_space_kind(SpaceKindDesc::new(3, SpaceHooks::new()))
                .is_err()
        );
    }

    #[test]
    fn test_entity_type_lookup() {
        let mut types = TypeRegistry::new();
        types.register_entity_type(EntityTypeDesc::new("Monster").use_aoi(false));

        assert!(!types.entity_type("Monster").unwrap().use_aoi);
        assert!(types.entity_type("Avatar").is_none());
    }
}
