//! World - the server runtime context owning every registry.
//!
//! The World holds the entity registry, the space registry, the hook tables
//! and the nil space singleton. Tests build a fresh World each; nothing here
//! is process-global.
//!
//! # Lifecycles
//!
//! ```text
//! space:  create ─▶ init (entity set, kind hooks) ─▶ created ─▶ active ─▶ destroy
//!         restore ─▶ init ─────────────────────────▶ restored ─┘
//!
//! entity: nil space ─enter─▶ space ─move*─▶ space ─leave─▶ nil space
//! ```
//!
//! All operations are synchronous and run to completion. Fatal invariant
//! violations come back as errors with [`SpaceError::is_fatal`] set; the
//! hosting runtime decides whether to stop.

use std::sync::Arc;

use rgb_aoi::{AoiBounds, AoiEvent, AoiEvents, AoiIndex, TowerAoi};
use tracing::{debug, error, info, warn};

use crate::client::{ClientSink, NullClientSink};
use crate::config::WorldConfig;
use crate::entity::{ClientId, EntityId, EntityIdAllocator, EntityRecord, SyncFlags, Vector3};
use crate::error::{SpaceError, SpaceResult};
use crate::hooks::{
    ContainmentHook, EntityEvent, EntityHooks, EntityTypeDesc, LifecycleHook, SpaceEvent,
    SpaceKindDesc, run_isolated,
};
use crate::registry::{EntityRegistry, SpaceRegistry, TypeRegistry};
use crate::space::{NIL_SPACE_KIND, SPACE_ENTITY_TYPE, SPACE_KIND_ATTR_KEY, Space};

/// Builds the spatial index of a space from its bounds and neighbor radius.
pub type AoiFactory = Box<dyn Fn(AoiBounds, f32) -> Box<dyn AoiIndex> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Spawn {
    Create,
    Restore,
}

/// The space containment runtime.
pub struct World {
    config: WorldConfig,
    ids: EntityIdAllocator,
    pub(crate) entities: EntityRegistry,
    spaces: SpaceRegistry,
    types: TypeRegistry,
    /// Established once by the first kind-0 space.
    nil_space: Option<EntityId>,
    clients: Arc<dyn ClientSink>,
    aoi_factory: AoiFactory,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    /// Create an empty world. The nil space must be created before any
    /// other entity.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            ids: EntityIdAllocator::new(),
            entities: EntityRegistry::new(),
            spaces: SpaceRegistry::new(),
            types: TypeRegistry::new(),
            nil_space: None,
            clients: Arc::new(NullClientSink),
            aoi_factory: Box::new(|bounds: AoiBounds, radius: f32| -> Box<dyn AoiIndex> {
                Box::new(TowerAoi::new(bounds, radius))
            }),
        }
    }

    /// Route client notifications to `sink`.
    #[must_use]
    pub fn with_client_sink(mut self, sink: impl ClientSink + 'static) -> Self {
        self.clients = Arc::new(sink);
        self
    }

    /// Replace the spatial index implementation used by [`World::configure_aoi`].
    #[must_use]
    pub fn with_aoi_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(AoiBounds, f32) -> Box<dyn AoiIndex> + Send + Sync + 'static,
    {
        self.aoi_factory = Box::new(factory);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ==================== Registration ====================

    pub fn register_entity_type(&mut self, desc: EntityTypeDesc) {
        self.types.register_entity_type(desc);
    }

    pub fn register_space_kind(&mut self, desc: SpaceKindDesc) -> SpaceResult<()> {
        self.types.register_space_kind(desc)
    }

    // ==================== Lookups ====================

    /// Global entity lookup.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.entities.get_mut(id)
    }

    /// Space registry lookup.
    #[must_use]
    pub fn space(&self, id: EntityId) -> Option<&Space> {
        self.spaces.lookup(id)
    }

    /// The nil space, once established.
    #[must_use]
    pub const fn nil_space(&self) -> Option<EntityId> {
        self.nil_space
    }

    /// Number of registered spaces, the nil space included.
    #[must_use]
    pub fn space_count(&self) -> usize {
        self.spaces.len()
    }

    /// Number of live entities, spaces included.
    #[must_use]
    pub fn entity_total(&self) -> usize {
        self.entities.len()
    }

    // ==================== Space Lifecycle ====================

    /// Create the process-wide nil space.
    pub fn create_nil_space(&mut self) -> SpaceResult<EntityId> {
        self.create_space(NIL_SPACE_KIND)
    }

    /// Create a fresh space of `kind`. Kind 0 establishes the nil space.
    pub fn create_space(&mut self, kind: i32) -> SpaceResult<EntityId> {
        let id = self.ids.allocate();
        self.check_nil_slot(kind, id)?;
        self.spawn_space(id, kind, Spawn::Create)
    }

    /// Bring back a space that already existed, e.g. after a node migration.
    ///
    /// Registry membership is re-established but the creation hook does not
    /// run again.
    pub fn restore_space(&mut self, id: EntityId, kind: i32) -> SpaceResult<EntityId> {
        if self.entities.contains(id) {
            return Err(SpaceError::DuplicateId(id));
        }
        self.check_nil_slot(kind, id)?;
        self.ids.reserve(id);
        self.spawn_space(id, kind, Spawn::Restore)
    }

    fn check_nil_slot(&self, kind: i32, duplicate: EntityId) -> SpaceResult<()> {
        if kind != NIL_SPACE_KIND {
            return Ok(());
        }
        match self.nil_space {
            Some(existing) => Err(self.fatal(SpaceError::DuplicateNilSpace {
                existing,
                duplicate,
            })),
            None => Ok(()),
        }
    }

    fn spawn_space(&mut self, id: EntityId, kind: i32, mode: Spawn) -> SpaceResult<EntityId> {
        // The nil space contains itself; every other space sits in the nil space.
        let home = if kind == NIL_SPACE_KIND {
            id
        } else {
            self.require_nil_space()?
        };

        let mut record =
            EntityRecord::new(id, SPACE_ENTITY_TYPE, home, false, EntityHooks::default());
        record.attrs.set_int(SPACE_KIND_ATTR_KEY, i64::from(kind));
        self.entities.insert(record)?;

        // init
        let on_init = self.types.space_hooks(kind).lifecycle(SpaceEvent::Init);
        self.run_lifecycle(on_init, id, "on_space_init");

        // created / restored: the init hook may have rewritten the kind
        let Some(kind) = self.read_kind(id) else {
            return Err(SpaceError::UnknownEntity(id));
        };
        let checked = if kind == NIL_SPACE_KIND {
            self.check_nil_slot(kind, id)
        } else {
            self.require_nil_space().map(|_| ())
        };
        let space = Space::new(id, kind, self.types.space_hooks(kind));
        if let Err(err) = checked.and_then(|()| self.spaces.register(id, space)) {
            self.entities.remove(id);
            return Err(err);
        }

        if kind == NIL_SPACE_KIND {
            self.nil_space = Some(id);
            info!(space = %id, "created nil space");
            return Ok(id);
        }

        match mode {
            Spawn::Create => {
                let on_created = self.space_hook(id, SpaceEvent::Created);
                self.run_lifecycle(on_created, id, "on_space_created");
            }
            Spawn::Restore => info!(space = %id, kind, "restored space"),
        }

        Ok(id)
    }

    /// Kind attribute of a live space entity. Out-of-range values read as nil.
    fn read_kind(&self, id: EntityId) -> Option<i32> {
        self.entities.get(id).map(|r| {
            i32::try_from(r.attrs.get_int(SPACE_KIND_ATTR_KEY)).unwrap_or(NIL_SPACE_KIND)
        })
    }

    /// Configure the spatial index of a space.
    ///
    /// Only allowed once, and only while the space is still empty.
    pub fn configure_aoi(
        &mut self,
        space: EntityId,
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
        radius: f32,
    ) -> SpaceResult<()> {
        let Some(target) = self.spaces.lookup(space) else {
            return Err(SpaceError::UnknownSpace(space));
        };
        if target.has_aoi() {
            return Err(self.fatal(SpaceError::AoiAlreadyConfigured(space)));
        }
        if target.entity_count() > 0 {
            return Err(self.fatal(SpaceError::AoiAfterEntered {
                space,
                count: target.entity_count(),
            }));
        }

        let bounds = AoiBounds::new(min_x, max_x, min_y, max_y);
        if !bounds.is_valid() || !radius.is_finite() || radius <= 0.0 {
            warn!(space = %space, min_x, max_x, min_y, max_y, radius, "rejected AOI settings");
            return Err(SpaceError::InvalidAoiSettings { space });
        }

        let aoi = (self.aoi_factory)(bounds, radius);
        if let Some(target) = self.spaces.lookup_mut(space) {
            target.set_aoi(aoi);
        }
        debug!(space = %space, min_x, max_x, min_y, max_y, radius, "space using AOI");
        Ok(())
    }

    /// [`World::configure_aoi`] with the configured default bounds and radius.
    pub fn configure_default_aoi(&mut self, space: EntityId) -> SpaceResult<()> {
        let bounds = self.config.aoi_bounds();
        let radius = self.config.aoi_radius;
        self.configure_aoi(
            space,
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y,
            radius,
        )
    }

    fn destroy_space(&mut self, id: EntityId) -> SpaceResult<()> {
        let on_destroy = self.space_hook(id, SpaceEvent::Destroy);
        self.run_lifecycle(on_destroy, id, "on_space_destroy");

        let members = self
            .spaces
            .lookup(id)
            .map(Space::entity_ids)
            .unwrap_or_default();
        for member in members {
            let still_inside = self.spaces.lookup(id).is_some_and(|s| s.contains(member));
            if !still_inside {
                continue;
            }
            if !self.entities.contains(member) {
                // Deregistered globally without leaving; drop the stale id.
                if let Some(space) = self.spaces.lookup_mut(id) {
                    space.aoi_leave(member);
                    space.remove(member);
                }
                continue;
            }
            if let Err(err) = self.destroy_entity(member) {
                warn!(space = %id, entity = %member, error = %err, "destroy failed, continuing with remaining entities");
            }
        }

        // Members whose destroy is further up the stack are only evicted here.
        let stragglers = self
            .spaces
            .lookup(id)
            .map(Space::entity_ids)
            .unwrap_or_default();
        for member in stragglers {
            if let Err(err) = self.leave_space(id, member) {
                warn!(space = %id, entity = %member, error = %err, "evict failed");
            }
        }

        self.spaces.unregister(id);
        self.entities.remove(id);
        debug!(space = %id, "space destroyed");
        Ok(())
    }

    // ==================== Entity Lifecycle ====================

    /// Create a new entity of `type_name` and place it in `space`.
    pub fn create_entity(
        &mut self,
        type_name: &str,
        space: EntityId,
        pos: Vector3,
    ) -> SpaceResult<EntityId> {
        let id = self.ids.allocate();
        self.spawn_entity(type_name, id, space, pos, None, Spawn::Create)
    }

    /// Load the entity `id` into `space`.
    ///
    /// If the entity is already live this call has no effect.
    pub fn load_entity(
        &mut self,
        type_name: &str,
        id: EntityId,
        space: EntityId,
        pos: Vector3,
    ) -> SpaceResult<EntityId> {
        if self.entities.contains(id) {
            debug!(entity = %id, "already loaded");
            return Ok(id);
        }
        self.ids.reserve(id);
        self.spawn_entity(type_name, id, space, pos, None, Spawn::Create)
    }

    /// Recover an entity whose client already knows about it.
    pub fn restore_entity(
        &mut self,
        type_name: &str,
        id: EntityId,
        space: EntityId,
        pos: Vector3,
        client: Option<ClientId>,
    ) -> SpaceResult<EntityId> {
        if self.entities.contains(id) {
            return Err(SpaceError::DuplicateId(id));
        }
        self.ids.reserve(id);
        self.spawn_entity(type_name, id, space, pos, client, Spawn::Restore)
    }

    fn spawn_entity(
        &mut self,
        type_name: &str,
        id: EntityId,
        space: EntityId,
        pos: Vector3,
        client: Option<ClientId>,
        mode: Spawn,
    ) -> SpaceResult<EntityId> {
        let Some(desc) = self.types.entity_type(type_name) else {
            return Err(SpaceError::UnknownEntityType(type_name.to_owned()));
        };
        let (use_aoi, hooks) = (desc.use_aoi, desc.hooks.clone());

        let nil = self.require_nil_space()?;
        if self.spaces.lookup(space).is_none() {
            return Err(SpaceError::UnknownSpace(space));
        }

        let mut record = EntityRecord::new(id, type_name, nil, use_aoi, hooks.clone());
        record.position = pos;
        record.client = client;
        self.entities.insert(record)?;

        self.run_lifecycle(hooks.lifecycle(EntityEvent::Init), id, "on_init");
        match mode {
            Spawn::Create => {
                self.run_lifecycle(hooks.lifecycle(EntityEvent::Created), id, "on_created");
            }
            Spawn::Restore => {
                self.run_lifecycle(hooks.lifecycle(EntityEvent::Restored), id, "on_restored");
            }
        }

        // A hook may have destroyed or placed the entity already.
        let unplaced = self.entities.get(id).is_some_and(|r| r.space == nil);
        if unplaced {
            self.enter_space(space, id, pos, mode == Spawn::Restore)?;
        }
        Ok(id)
    }

    /// Destroy an entity. Destroying a space destroys everything inside it.
    ///
    /// Destroying something already being destroyed, e.g. from its own
    /// destroy hook, does nothing.
    pub fn destroy_entity(&mut self, id: EntityId) -> SpaceResult<()> {
        if self.nil_space == Some(id) {
            return Err(self.fatal(SpaceError::NilSpaceIndestructible(id)));
        }
        let Some(record) = self.entities.get_mut(id) else {
            return Err(SpaceError::UnknownEntity(id));
        };
        if record.destroying {
            debug!(entity = %id, "already being destroyed");
            return Ok(());
        }
        record.destroying = true;

        if self.spaces.lookup(id).is_some() {
            return self.destroy_space(id);
        }

        let on_destroy = self
            .entities
            .get(id)
            .and_then(|r| r.hooks.lifecycle(EntityEvent::Destroy));
        self.run_lifecycle(on_destroy, id, "on_destroy");

        let Some(record) = self.entities.get(id) else {
            return Ok(());
        };
        let space = record.space;
        if Some(space) != self.nil_space {
            self.leave_space(space, id)?;
        }

        if let Some(record) = self.entities.remove(id) {
            if let Some(client) = record.client {
                self.clients.notify_destroy(client, id);
            }
        }
        debug!(entity = %id, "entity destroyed");
        Ok(())
    }

    /// Attach or detach the client of an entity.
    ///
    /// A new client first sees the space entity, then its own entity, then
    /// every current neighbor. A detached client is told to drop them again.
    pub fn set_client(&mut self, entity: EntityId, client: Option<ClientId>) -> SpaceResult<()> {
        let Some(record) = self.entities.get_mut(entity) else {
            return Err(SpaceError::UnknownEntity(entity));
        };
        let old = std::mem::replace(&mut record.client, client);
        if old == client {
            return Ok(());
        }

        let space = record.space;
        let view = self
            .spaces
            .lookup(space)
            .filter(|s| s.contains(entity))
            .and_then(Space::aoi)
            .map(|aoi| aoi.neighbors(entity.aoi_handle()));

        if let Some(old) = old {
            if let Some(neighbors) = &view {
                for n in neighbors {
                    self.clients
                        .notify_destroy(old, EntityId::from_aoi_handle(*n));
                }
                self.clients.notify_destroy(old, space);
            }
            self.clients.notify_destroy(old, entity);
        }

        if let Some(new) = client {
            if view.is_some() {
                self.clients.notify_create(new, space, false);
            }
            self.clients.notify_create(new, entity, true);
            for n in view.iter().flatten() {
                self.clients
                    .notify_create(new, EntityId::from_aoi_handle(*n), false);
            }
        }
        Ok(())
    }

    // ==================== Containment ====================

    /// Place `entity` into `space` at `pos`.
    ///
    /// The entity must currently be in the nil space. Entering the nil space
    /// itself, or entering with a type that opted out of AOI, only records the
    /// position.
    pub fn enter_space(
        &mut self,
        space: EntityId,
        entity: EntityId,
        pos: Vector3,
        is_restoring: bool,
    ) -> SpaceResult<()> {
        let nil = self.require_nil_space()?;
        let Some(target) = self.spaces.lookup(space) else {
            return Err(SpaceError::UnknownSpace(space));
        };
        let Some(record) = self.entities.get(entity) else {
            return Err(SpaceError::UnknownEntity(entity));
        };
        if record.space != nil {
            return Err(self.fatal(SpaceError::NotInNilSpace {
                space,
                entity,
                current: record.space,
            }));
        }

        if self.config.debug_spaces {
            debug!(
                space = %target,
                entity = %record,
                count = target.entity_count(),
                "enter <<<"
            );
        }

        let skip = target.is_nil() || !record.use_aoi;
        let has_aoi = target.has_aoi();

        let Some(record) = self.entities.get_mut(entity) else {
            return Err(SpaceError::UnknownEntity(entity));
        };
        record.position = pos;
        if skip {
            return Ok(());
        }

        record.space = space;
        record.sync_flags |= SyncFlags::OWN_CLIENT | SyncFlags::NEIGHBOR_CLIENTS;
        if let Some(target) = self.spaces.lookup_mut(space) {
            target.insert(entity);
        }

        if !has_aoi {
            return Ok(());
        }

        if is_restoring {
            // The client already knows its surroundings.
            let client = record.client.take();
            let events = self.track(space, entity, pos);
            self.replicate(&events);
            if let Some(record) = self.entities.get_mut(entity) {
                record.client = client;
            }
        } else {
            // Space entity first so the client has a container for everything else.
            if let Some(client) = record.client {
                self.clients.notify_create(client, space, false);
            }
            let events = self.track(space, entity, pos);
            self.replicate(&events);

            let on_enter = self.space_containment_hook(space, SpaceEvent::EntityEnterSpace);
            self.run_containment(on_enter, space, entity, true, "on_entity_enter_space");
            let on_enter = self.entity_containment_hook(entity, EntityEvent::EnterSpace);
            self.run_containment(on_enter, space, entity, false, "on_enter_space");
        }

        Ok(())
    }

    /// Take `entity` out of `space`, back into the nil space.
    pub fn leave_space(&mut self, space: EntityId, entity: EntityId) -> SpaceResult<()> {
        let nil = self.require_nil_space()?;
        let Some(source) = self.spaces.lookup(space) else {
            return Err(SpaceError::UnknownSpace(space));
        };
        let is_member = source.contains(entity)
            && self.entities.get(entity).is_some_and(|r| r.space == space);
        if !is_member {
            return Err(self.fatal(SpaceError::NotInSpace { space, entity }));
        }
        let has_aoi = source.has_aoi();

        if has_aoi {
            let events = self
                .spaces
                .lookup_mut(space)
                .map(|s| s.aoi_leave(entity))
                .unwrap_or_default();
            self.replicate(&events);
            if let Some(client) = self.entities.get(entity).and_then(EntityRecord::client) {
                self.clients.notify_destroy(client, space);
            }
        }

        if let Some(source) = self.spaces.lookup_mut(space) {
            source.remove(entity);
        }
        if let Some(record) = self.entities.get_mut(entity) {
            record.space = nil;
            record.aoi = None;
        }

        if has_aoi {
            let on_leave = self.space_containment_hook(space, SpaceEvent::EntityLeaveSpace);
            self.run_containment(on_leave, space, entity, true, "on_entity_leave_space");
            let on_leave = self.entity_containment_hook(entity, EntityEvent::LeaveSpace);
            self.run_containment(on_leave, space, entity, false, "on_leave_space");
        }

        Ok(())
    }

    /// Move an entity within its current space.
    ///
    /// The stored position always changes; the spatial index only hears about
    /// it when the space has one.
    pub fn move_entity(&mut self, entity: EntityId, pos: Vector3) -> SpaceResult<()> {
        let Some(record) = self.entities.get_mut(entity) else {
            return Err(SpaceError::UnknownEntity(entity));
        };
        record.position = pos;
        let space = record.space;

        let events = match self.spaces.lookup_mut(space) {
            Some(s) if s.has_aoi() && s.contains(entity) => s.aoi_moved(entity, pos.x, pos.z),
            _ => return Ok(()),
        };
        self.replicate(&events);
        Ok(())
    }

    fn track(&mut self, space: EntityId, entity: EntityId, pos: Vector3) -> AoiEvents {
        let events = self
            .spaces
            .lookup_mut(space)
            .map(|s| s.aoi_enter(entity, pos.x, pos.z))
            .unwrap_or_default();
        if let Some(record) = self.entities.get_mut(entity) {
            record.aoi = Some(entity.aoi_handle());
        }
        events
    }

    /// Turn neighbor changes into notifications for the watchers' clients.
    fn replicate(&self, events: &AoiEvents) {
        for event in events {
            let watcher = EntityId::from_aoi_handle(event.watcher());
            let target = EntityId::from_aoi_handle(event.target());
            let Some(client) = self.entities.get(watcher).and_then(EntityRecord::client) else {
                continue;
            };
            match event {
                AoiEvent::Enter { .. } => self.clients.notify_create(client, target, false),
                AoiEvent::Leave { .. } => self.clients.notify_destroy(client, target),
            }
        }
    }

    // ==================== Queries ====================

    /// Number of entities of `type_name` in a space.
    #[must_use]
    pub fn count_entities(&self, space: EntityId, type_name: &str) -> usize {
        let Some(space) = self.spaces.lookup(space) else {
            return 0;
        };
        space
            .entity_ids()
            .into_iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|r| r.type_name == type_name)
            .count()
    }

    /// Total number of entities in a space.
    #[must_use]
    pub fn entity_count(&self, space: EntityId) -> usize {
        self.spaces.lookup(space).map_or(0, Space::entity_count)
    }

    /// Visit every entity in a space.
    ///
    /// Iterates a snapshot, so the visitor may move entities in and out.
    pub fn for_each_entity<F>(&mut self, space: EntityId, mut visitor: F)
    where
        F: FnMut(&mut World, EntityId),
    {
        let snapshot = self
            .spaces
            .lookup(space)
            .map(Space::entity_ids)
            .unwrap_or_default();
        for id in snapshot {
            visitor(self, id);
        }
    }

    /// The entity `id`, only if it is both live and inside `space`.
    #[must_use]
    pub fn get_entity(&self, space: EntityId, id: EntityId) -> Option<&EntityRecord> {
        let record = self.entities.get(id)?;
        self.spaces
            .lookup(space)
            .filter(|s| s.contains(id))
            .map(|_| record)
    }

    // ==================== Hook Dispatch ====================

    fn space_hook(&self, space: EntityId, event: SpaceEvent) -> Option<LifecycleHook> {
        self.spaces
            .lookup(space)
            .and_then(|s| s.hooks.lifecycle(event))
    }

    fn space_containment_hook(&self, space: EntityId, event: SpaceEvent) -> Option<ContainmentHook> {
        self.spaces
            .lookup(space)
            .and_then(|s| s.hooks.containment(event))
    }

    fn entity_containment_hook(
        &self,
        entity: EntityId,
        event: EntityEvent,
    ) -> Option<ContainmentHook> {
        self.entities
            .get(entity)
            .and_then(|r| r.hooks.containment(event))
    }

    fn run_lifecycle(&mut self, hook: Option<LifecycleHook>, target: EntityId, name: &'static str) {
        let Some(hook) = hook else {
            if self.config.debug_spaces {
                debug!(entity = %target, hook = name, "default hook");
            }
            return;
        };
        if let Err(failure) = run_isolated(|| hook(self, target)) {
            warn!(entity = %target, hook = name, error = %failure, "hook failed");
        }
    }

    fn run_containment(
        &mut self,
        hook: Option<ContainmentHook>,
        space: EntityId,
        entity: EntityId,
        space_side: bool,
        name: &'static str,
    ) {
        let Some(hook) = hook else {
            if self.config.debug_spaces {
                debug!(space = %space, entity = %entity, hook = name, "default hook");
            }
            return;
        };
        let result = run_isolated(|| {
            if space_side {
                hook(self, space, entity)
            } else {
                hook(self, entity, space)
            }
        });
        if let Err(failure) = result {
            warn!(space = %space, entity = %entity, hook = name, error = %failure, "hook failed");
        }
    }

    // ==================== Invariants ====================

    fn require_nil_space(&self) -> SpaceResult<EntityId> {
        self.nil_space
            .ok_or_else(|| self.fatal(SpaceError::NilSpaceMissing))
    }

    /// Single exit point for invariant violations.
    fn fatal(&self, err: SpaceError) -> SpaceError {
        debug_assert!(err.is_fatal());
        error!(error = %err, "space invariant violated");
        err
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("spaces", &self.spaces.len())
            .field("nil_space", &self.nil_space)
            .finish_non_exhaustive()
    }
}
