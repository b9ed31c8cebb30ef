//! Kind hooks: per space kind and per entity type override tables.
//!
//! Each lifecycle or containment event resolves to at most one override.
//! The world always performs the fixed bookkeeping for an event itself and
//! then calls the override, or the default body (a debug log) when none is
//! registered. Tables are resolved once when a kind or type is registered
//! and copied onto each instance at init.
//!
//! Overrides run fault-isolated: an `Err` or a panic is logged with the
//! space and entity identity and swallowed.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::entity::EntityId;
use crate::world::World;

/// Hook receiving one entity (a space or a plain entity).
pub type LifecycleHook = Arc<dyn Fn(&mut World, EntityId) -> eyre::Result<()> + Send + Sync>;

/// Hook receiving a space and an entity.
///
/// Space-side hooks get `(space, entity)`, entity-side hooks get
/// `(entity, space)`.
pub type ContainmentHook =
    Arc<dyn Fn(&mut World, EntityId, EntityId) -> eyre::Result<()> + Send + Sync>;

/// Space lifecycle and containment events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpaceEvent {
    Init,
    Created,
    Destroy,
    EntityEnterSpace,
    EntityLeaveSpace,
}

/// Entity lifecycle and containment events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityEvent {
    Init,
    Created,
    Restored,
    Destroy,
    EnterSpace,
    LeaveSpace,
}

/// Override table for a space kind.
#[derive(Clone, Default)]
pub struct SpaceHooks {
    pub(crate) on_space_init: Option<LifecycleHook>,
    pub(crate) on_space_created: Option<LifecycleHook>,
    pub(crate) on_space_destroy: Option<LifecycleHook>,
    pub(crate) on_entity_enter_space: Option<ContainmentHook>,
    pub(crate) on_entity_leave_space: Option<ContainmentHook>,
}

impl SpaceHooks {
    /// Create an empty table; every event uses its default body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs after the entity set is allocated.
    #[must_use]
    pub fn on_space_init<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_space_init = Some(Arc::new(f));
        self
    }

    /// Runs once on fresh creation, never on restore.
    #[must_use]
    pub fn on_space_created<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_space_created = Some(Arc::new(f));
        self
    }

    /// Runs before contained entities are destroyed.
    #[must_use]
    pub fn on_space_destroy<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_space_destroy = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_entity_enter_space<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_entity_enter_space = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_entity_leave_space<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_entity_leave_space = Some(Arc::new(f));
        self
    }

    pub(crate) fn lifecycle(&self, event: SpaceEvent) -> Option<LifecycleHook> {
        match event {
            SpaceEvent::Init => self.on_space_init.clone(),
            SpaceEvent::Created => self.on_space_created.clone(),
            SpaceEvent::Destroy => self.on_space_destroy.clone(),
            SpaceEvent::EntityEnterSpace | SpaceEvent::EntityLeaveSpace => None,
        }
    }

    pub(crate) fn containment(&self, event: SpaceEvent) -> Option<ContainmentHook> {
        match event {
            SpaceEvent::EntityEnterSpace => self.on_entity_enter_space.clone(),
            SpaceEvent::EntityLeaveSpace => self.on_entity_leave_space.clone(),
            SpaceEvent::Init | SpaceEvent::Created | SpaceEvent::Destroy => None,
        }
    }
}

impl fmt::Debug for SpaceHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaceHooks")
            .field("on_space_init", &self.on_space_init.is_some())
            .field("on_space_created", &self.on_space_created.is_some())
            .field("on_space_destroy", &self.on_space_destroy.is_some())
            .field("on_entity_enter_space", &self.on_entity_enter_space.is_some())
            .field("on_entity_leave_space", &self.on_entity_leave_space.is_some())
            .finish()
    }
}

/// Override table for an entity type.
#[derive(Clone, Default)]
pub struct EntityHooks {
    pub(crate) on_init: Option<LifecycleHook>,
    pub(crate) on_created: Option<LifecycleHook>,
    pub(crate) on_restored: Option<LifecycleHook>,
    pub(crate) on_destroy: Option<LifecycleHook>,
    pub(crate) on_enter_space: Option<ContainmentHook>,
    pub(crate) on_leave_space: Option<ContainmentHook>,
}

impl EntityHooks {
    /// Create an empty table; every event uses its default body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_init = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_created<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_created = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_restored<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_restored = Some(Arc::new(f));
        self
    }

    /// Runs before the entity leaves its space and is deregistered.
    #[must_use]
    pub fn on_destroy<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_destroy = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_enter_space<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_enter_space = Some(Arc::new(f));
        self
    }

    /// Receives the space that was just left.
    #[must_use]
    pub fn on_leave_space<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut World, EntityId, EntityId) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.on_leave_space = Some(Arc::new(f));
        self
    }

    pub(crate) fn lifecycle(&self, event: EntityEvent) -> Option<LifecycleHook> {
        match event {
            EntityEvent::Init => self.on_init.clone(),
            EntityEvent::Created => self.on_created.clone(),
            EntityEvent::Restored => self.on_restored.clone(),
            EntityEvent::Destroy => self.on_destroy.clone(),
            EntityEvent::EnterSpace | EntityEvent::LeaveSpace => None,
        }
    }

    pub(crate) fn containment(&self, event: EntityEvent) -> Option<ContainmentHook> {
        match event {
            EntityEvent::EnterSpace => self.on_enter_space.clone(),
            EntityEvent::LeaveSpace => self.on_leave_space.clone(),
            _ => None,
        }
    }
}

impl fmt::Debug for EntityHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityHooks")
            .field("on_init", &self.on_init.is_some())
            .field("on_created", &self.on_created.is_some())
            .field("on_restored", &self.on_restored.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .field("on_enter_space", &self.on_enter_space.is_some())
            .field("on_leave_space", &self.on_leave_space.is_some())
            .finish()
    }
}

/// Registration of a space kind.
#[derive(Clone, Debug)]
pub struct SpaceKindDesc {
    pub kind: i32,
    pub hooks: SpaceHooks,
}

impl SpaceKindDesc {
    #[must_use]
    pub const fn new(kind: i32, hooks: SpaceHooks) -> Self {
        Self { kind, hooks }
    }
}

/// Registration of an entity type.
#[derive(Clone, Debug)]
pub struct EntityTypeDesc {
    pub name: String,
    /// `false` opts the type out of spatial tracking.
    pub use_aoi: bool,
    pub hooks: EntityHooks,
}

impl EntityTypeDesc {
    /// A spatially tracked type with default hooks.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_aoi: true,
            hooks: EntityHooks::default(),
        }
    }

    #[must_use]
    pub fn use_aoi(mut self, use_aoi: bool) -> Self {
        self.use_aoi = use_aoi;
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: EntityHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// Why a hook body did not complete.
#[derive(Debug)]
pub enum HookFailure {
    Error(eyre::Report),
    Panic(String),
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(report) => write!(f, "{report:#}"),
            Self::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// Run a hook body, converting both errors and panics into [`HookFailure`].
pub(crate) fn run_isolated<F>(body: F) -> Result<(), HookFailure>
where
    F: FnOnce() -> eyre::Result<()>,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(report)) => Err(HookFailure::Error(report)),
        Err(payload) => Err(HookFailure::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_isolated_ok() {
        assert!(run_isolated(|| Ok(())).is_ok());
    }

    #[test]
    fn test_run_isolated_catches_error() {
        let failure = run_isolated(|| Err(eyre::eyre!("boom"))).unwrap_err();
        assert!(matches!(failure, HookFailure::Error(_)));
        assert_eq!(failure.to_string(), "boom");
    }

    #[test]
    fn test_run_isolated_catches_panic() {
        let failure = run_isolated(|| panic!("hook exploded")).unwrap_err();
        assert_eq!(failure.to_string(), "panicked: hook exploded");
    }

    #[test]
    fn test_tables_resolve_registered_events_only() {
        let hooks = SpaceHooks::new().on_space_created(|_, _| Ok(()));

        assert!(hooks.lifecycle(SpaceEvent::Created).is_some());
        assert!(hooks.lifecycle(SpaceEvent::Destroy).is_none());
        assert!(hooks.containment(SpaceEvent::Created).is_none());

        let hooks = EntityHooks::new().on_leave_space(|_, _, _| Ok(()));
        assert!(hooks.containment(EntityEvent::LeaveSpace).is_some());
        assert!(hooks.containment(EntityEvent::EnterSpace).is_none());
    }
}
