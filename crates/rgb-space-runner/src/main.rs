//! Headless space simulation
//!
//! This binary:
//! 1. Builds a world with a nil space and one arena using the default AOI
//! 2. Spawns a player avatar and a ring of monsters
//! 3. Walks the avatar across the arena, logging what its client is told
//! 4. Tears the arena down
//!
//! Configuration:
//! - `RGB_SPACE_CONFIG` - path to a JSON [`WorldConfig`]
//! - `RGB_SPACE_DEBUG`, `RGB_SPACE_AOI_RADIUS` - overrides on top of it
//! - `TARGET_FPS` / `TICKS` - pacing of the walk

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rgb_space::prelude::*;
use rgb_space::{Notification, SpaceResult};
use tracing::{error, info};

const ARENA_KIND: i32 = 1;
const PLAYER: ClientId = ClientId(1);

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rgb_space_runner=info".parse()?)
                .add_directive("rgb_space=info".parse()?),
        )
        .init();

    let config = load_config()?;
    info!(?config, "Starting space runner");

    let target_fps: f32 = std::env::var("TARGET_FPS")
        .ok()
        .and_then(|p| p.parse().ok())
        .filter(|fps: &f32| *fps > 0.0)
        .unwrap_or(20.0);
    let ticks: u32 = std::env::var("TICKS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(40);

    if let Err(err) = run(config, target_fps, ticks) {
        if err.is_fatal() {
            error!(error = %err, "fatal space error, shutting down");
            std::process::exit(1);
        }
        return Err(err.into());
    }

    Ok(())
}

fn load_config() -> eyre::Result<WorldConfig> {
    let Some(path) = std::env::var_os("RGB_SPACE_CONFIG").map(PathBuf::from) else {
        return Ok(WorldConfig::from_env());
    };

    info!("Config file: {}", path.display());
    let raw = std::fs::read_to_string(&path)?;
    let config: WorldConfig = serde_json::from_str(&raw)?;
    Ok(config.with_env())
}

fn run(config: WorldConfig, target_fps: f32, ticks: u32) -> SpaceResult<()> {
    let outbox = ClientOutbox::new();
    let mut world = World::new(config).with_client_sink(outbox.clone());

    world.register_entity_type(EntityTypeDesc::new("Avatar").hooks(
        EntityHooks::new().on_enter_space(|world, avatar, space| {
            let monsters = world.count_entities(space, "Monster");
            info!(%avatar, %space, monsters, "avatar entered arena");
            Ok(())
        }),
    ));
    world.register_entity_type(EntityTypeDesc::new("Monster"));
    world.register_space_kind(SpaceKindDesc::new(
        ARENA_KIND,
        SpaceHooks::new()
            .on_space_created(|world, space| {
                world.configure_default_aoi(space)?;
                Ok(())
            })
            .on_space_destroy(|world, space| {
                info!(%space, remaining = world.entity_count(space), "arena closing");
                Ok(())
            }),
    ))?;

    let nil = world.create_nil_space()?;
    let arena = world.create_space(ARENA_KIND)?;

    let radius = world.config().aoi_radius;
    for i in 0..8 {
        let x = -400.0 + i as f32 * radius;
        world.create_entity("Monster", arena, Vector3::new(x, 0.0, 0.0))?;
    }

    let avatar = world.create_entity("Avatar", nil, Vector3::new(-500.0, 0.0, 0.0))?;
    world.set_client(avatar, Some(PLAYER))?;
    world.enter_space(arena, avatar, Vector3::new(-500.0, 0.0, 0.0), false)?;
    report(&outbox);

    let target_delta = Duration::from_secs_f32(1.0 / target_fps);
    let step = 1000.0 / ticks.max(1) as f32;
    for tick in 1..=ticks {
        let start = Instant::now();

        let pos = Vector3::new(-500.0 + tick as f32 * step, 0.0, 0.0);
        world.move_entity(avatar, pos)?;
        let changes = outbox.pending(PLAYER).len();
        if changes > 0 {
            info!(tick, x = pos.x, changes, "view changed");
            report(&outbox);
        }

        let elapsed = start.elapsed();
        if elapsed < target_delta {
            std::thread::sleep(target_delta - elapsed);
        }
    }

    world.leave_space(arena, avatar)?;
    report(&outbox);

    world.destroy_entity(arena)?;
    info!(
        spaces = world.space_count(),
        entities = world.entity_total(),
        "Shutting down..."
    );
    Ok(())
}

fn report(outbox: &ClientOutbox) {
    for notification in outbox.drain(PLAYER) {
        match notification {
            Notification::Create { entity, is_initial } => {
                info!(%entity, is_initial, "client <- create");
            }
            Notification::Destroy { entity } => info!(%entity, "client <- destroy"),
        }
    }
}
