//! Integration tests for rgb-space

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rgb_space::prelude::*;
use rgb_space::{Notification, SyncFlags};

// ============================================================================
// Helpers
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn world() -> (World, ClientOutbox) {
    init_tracing();

    let outbox = ClientOutbox::new();
    let config = WorldConfig {
        debug_spaces: true,
        ..WorldConfig::default()
    };
    let mut world = World::new(config).with_client_sink(outbox.clone());
    world.register_entity_type(EntityTypeDesc::new("Avatar"));
    world.register_entity_type(EntityTypeDesc::new("Monster"));
    world.create_nil_space().unwrap();
    (world, outbox)
}

const fn at(x: f32, z: f32) -> Vector3 {
    Vector3::new(x, 0.0, z)
}

// ============================================================================
// Null Space
// ============================================================================

#[test]
fn test_exactly_one_nil_space() {
    let (mut world, _) = world();
    let nil = world.nil_space().unwrap();

    let err = world.create_space(0).unwrap_err();
    assert!(err.is_fatal());

    let err = world.restore_space(EntityId::new(1234), 0).unwrap_err();
    assert!(err.is_fatal());

    assert_eq!(world.nil_space(), Some(nil));
    assert_eq!(world.space_count(), 1);
}

// ============================================================================
// Containment Protocol
// ============================================================================

#[test]
fn test_transfer_between_spaces_goes_through_nil() {
    let (mut world, outbox) = world();
    let nil = world.nil_space().unwrap();
    let forest = world.create_space(1).unwrap();
    let dungeon = world.create_space(2).unwrap();
    world.configure_default_aoi(forest).unwrap();
    world.configure_default_aoi(dungeon).unwrap();

    let hero = world.create_entity("Avatar", forest, at(0.0, 0.0)).unwrap();
    world.set_client(hero, Some(ClientId(1))).unwrap();
    outbox.drain(ClientId(1));

    // Direct transfer is refused
    assert!(world.enter_space(dungeon, hero, at(0.0, 0.0), false).is_err());

    world.leave_space(forest, hero).unwrap();
    assert_eq!(world.entity(hero).unwrap().space(), nil);
    world.enter_space(dungeon, hero, at(5.0, 5.0), false).unwrap();

    assert_eq!(world.entity(hero).unwrap().space(), dungeon);
    assert_eq!(world.entity_count(forest), 0);
    assert_eq!(world.entity_count(dungeon), 1);
    assert_eq!(outbox.drain(ClientId(1)), vec![
        Notification::Destroy { entity: forest },
        Notification::Create {
            entity: dungeon,
            is_initial: false,
        },
    ]);
}

#[test]
fn test_single_create_for_space_entity() {
    let (mut world, outbox) = world();
    let arena = world.create_space(1).unwrap();
    world
        .configure_aoi(arena, -1000.0, 1000.0, -1000.0, 1000.0, 100.0)
        .unwrap();

    let nil = world.nil_space().unwrap();
    let x = world.create_entity("Avatar", nil, at(0.0, 0.0)).unwrap();
    world.set_client(x, Some(ClientId(9))).unwrap();
    outbox.drain(ClientId(9));

    world.enter_space(arena, x, at(0.0, 0.0), false).unwrap();
    world.move_entity(x, at(50.0, 0.0)).unwrap();

    assert_eq!(outbox.drain(ClientId(9)), vec![Notification::Create {
        entity: arena,
        is_initial: false,
    }]);
    let handle = x.aoi_handle();
    assert_eq!(
        world.space(arena).unwrap().aoi().unwrap().neighbors(handle),
        vec![]
    );
}

#[test]
fn test_sync_flags_set_on_tracked_entry() {
    let (mut world, _) = world();
    let arena = world.create_space(1).unwrap();

    let nil = world.nil_space().unwrap();
    let idle = world.create_entity("Monster", nil, at(0.0, 0.0)).unwrap();
    assert_eq!(world.entity(idle).unwrap().sync_flags(), SyncFlags::empty());

    let mob = world.create_entity("Monster", arena, at(0.0, 0.0)).unwrap();
    assert!(
        world
            .entity(mob)
            .unwrap()
            .sync_flags()
            .contains(SyncFlags::OWN_CLIENT | SyncFlags::NEIGHBOR_CLIENTS)
    );
}

#[test]
fn test_queries() {
    let (mut world, _) = world();
    let arena = world.create_space(1).unwrap();
    world.configure_default_aoi(arena).unwrap();

    let avatar = world.create_entity("Avatar", arena, at(0.0, 0.0)).unwrap();
    for i in 0..3 {
        world
            .create_entity("Monster", arena, at(i as f32 * 200.0, 0.0))
            .unwrap();
    }

    assert_eq!(world.entity_count(arena), 4);
    assert_eq!(world.count_entities(arena, "Monster"), 3);
    assert_eq!(world.count_entities(arena, "Avatar"), 1);
    assert_eq!(world.count_entities(arena, "Dragon"), 0);
    assert_eq!(world.get_entity(arena, avatar).unwrap().type_name(), "Avatar");

    let mut seen = Vec::new();
    world.for_each_entity(arena, |_, id| seen.push(id));
    assert_eq!(seen.len(), 4);
    assert!(seen.contains(&avatar));
}

// ============================================================================
// Lifecycle And Hooks
// ============================================================================

#[test]
fn test_space_destroy_runs_hook_then_cascade() {
    let (mut world, outbox) = world();
    let destroyed = Arc::new(AtomicU32::new(0));

    let seen = destroyed.clone();
    world
        .register_space_kind(SpaceKindDesc::new(
            5,
            SpaceHooks::new().on_space_destroy(move |world, space| {
                // Members are still inside when the override runs
                seen.store(world.entity_count(space) as u32, Ordering::SeqCst);
                Ok(())
            }),
        ))
        .unwrap();

    let raid = world.create_space(5).unwrap();
    world.configure_default_aoi(raid).unwrap();
    let a = world.create_entity("Avatar", raid, at(0.0, 0.0)).unwrap();
    let b = world.create_entity("Avatar", raid, at(20.0, 0.0)).unwrap();
    world.set_client(a, Some(ClientId(1))).unwrap();
    outbox.drain(ClientId(1));

    world.destroy_entity(raid).unwrap();

    assert_eq!(destroyed.load(Ordering::SeqCst), 2);
    assert!(world.space(raid).is_none());
    assert!(world.entity(a).is_none());
    assert!(world.entity(b).is_none());

    // a's client dropped its neighbor, the space and finally its own entity
    let drained = outbox.drain(ClientId(1));
    assert!(drained.contains(&Notification::Destroy { entity: raid }));
    assert_eq!(drained.last(), Some(&Notification::Destroy { entity: a }));
}

#[test]
fn test_space_created_hook_can_populate_space() {
    let (mut world, _) = world();
    world
        .register_space_kind(SpaceKindDesc::new(
            7,
            SpaceHooks::new().on_space_created(|world, space| {
                world.configure_default_aoi(space)?;
                world.create_entity("Monster", space, Vector3::new(1.0, 0.0, 1.0))?;
                Ok(())
            }),
        ))
        .unwrap();

    let spawned = world.create_space(7).unwrap();

    assert!(world.space(spawned).unwrap().has_aoi());
    assert_eq!(world.count_entities(spawned, "Monster"), 1);
}

#[test]
fn test_entity_hooks_fire_in_lifecycle_order() {
    let (mut world, _) = world();
    let log = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let (l1, l2, l3, l4, l5) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
    world.register_entity_type(
        EntityTypeDesc::new("Npc").hooks(
            EntityHooks::new()
                .on_init(move |_, _| {
                    l1.lock().push("init");
                    Ok(())
                })
                .on_created(move |_, _| {
                    l2.lock().push("created");
                    Ok(())
                })
                .on_enter_space(move |_, _, _| {
                    l3.lock().push("enter");
                    Ok(())
                })
                .on_leave_space(move |_, _, _| {
                    l4.lock().push("leave");
                    Ok(())
                })
                .on_destroy(move |_, _| {
                    l5.lock().push("destroy");
                    Ok(())
                }),
        ),
    );
    let arena = world.create_space(1).unwrap();
    world.configure_default_aoi(arena).unwrap();

    let npc = world.create_entity("Npc", arena, at(0.0, 0.0)).unwrap();
    world.destroy_entity(npc).unwrap();

    assert_eq!(*log.lock(), vec!["init", "created", "enter", "destroy", "leave"]);
}

#[test]
fn test_hook_error_is_contained() {
    let (mut world, _) = world();
    world
        .register_space_kind(SpaceKindDesc::new(
            4,
            SpaceHooks::new()
                .on_space_created(|_, _| Err(eyre::eyre!("created failed")))
                .on_entity_leave_space(|_, _, _| panic!("leave exploded")),
        ))
        .unwrap();

    let arena = world.create_space(4).unwrap();
    world.configure_default_aoi(arena).unwrap();
    let avatar = world.create_entity("Avatar", arena, at(0.0, 0.0)).unwrap();

    world.leave_space(arena, avatar).unwrap();

    assert_eq!(world.entity(avatar).unwrap().space(), world.nil_space().unwrap());
    assert_eq!(world.entity_count(arena), 0);
}
