use bevy::app::ScheduleRunnerPlugin;
use bevy::core::FrameCount;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use sf_entity_spawn::{
    ChunkFiller, ChunkPopulator, EntityData, SfEntitySpawnPlugin, SpawnConfig,
    SpawnNearOriginRequest,
};
use sf_persistence::{load_catalog, load_config, save_path, SfPersistencePlugin, SPAWN_DIR};
use std::path::Path;
use std::time::Duration;

/// Scout speed in world units per second.
const SCOUT_SPEED: f32 = 40.0;
/// Chunks kept filled around the scout.
const SCOUT_RADIUS: u32 = 2;
/// Frames to run before shutting down once the batch queue is idle.
const DEMO_FRAMES: u32 = 600;
const PROGRESS_INTERVAL: u32 = 120;

fn main() {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
        LogPlugin::default(),
    ));

    let spawn_dir = Path::new(SPAWN_DIR);
    let config = match load_config(&spawn_dir.join("config.ron")) {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default spawn config: {}", e);
            SpawnConfig::default()
        }
    };
    let catalog = match load_catalog(&spawn_dir.join("catalog.ron")) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to load spawn catalog: {}", e);
            return;
        }
    };
    info!(
        "Loaded {} spawn definitions, chunk size {}",
        catalog.len(),
        config.chunk_size
    );

    app.add_plugins((
        SfEntitySpawnPlugin::new(config, catalog),
        SfPersistencePlugin::new(save_path("fill_state")),
    ))
    .add_systems(Startup, (spawn_scout, request_home_beacon))
    .add_systems(Update, (move_scout, report_progress, finish_demo))
    .run();
}

/// Marker for the entity flying outward from the origin.
#[derive(Component)]
struct Scout;

fn spawn_scout(mut commands: Commands) {
    commands.spawn((
        Name::new("Scout"),
        Scout,
        Transform::default(),
        ChunkFiller::new(SCOUT_RADIUS),
    ));
}

fn request_home_beacon(mut requests: EventWriter<SpawnNearOriginRequest>) {
    requests.send(SpawnNearOriginRequest {
        definition: "beacon".into(),
        data: Some(EntityData::labeled("home").with_property("signal", 1.0)),
    });
}

fn move_scout(time: Res<Time>, mut scouts: Query<&mut Transform, With<Scout>>) {
    for mut transform in &mut scouts {
        transform.translation.x += SCOUT_SPEED * time.delta_secs();
        transform.translation.y += SCOUT_SPEED * 0.5 * time.delta_secs();
    }
}

fn report_progress(frames: Res<FrameCount>, populator: Res<ChunkPopulator>) {
    if frames.0 == 0 || frames.0 % PROGRESS_INTERVAL != 0 {
        return;
    }
    let stats = populator.stats();
    info!(
        "Frame {}: {} chunks filled, {} entities placed, {} queued, {} failures",
        frames.0,
        stats.chunks_filled,
        stats.entities_placed,
        populator.pending_len(),
        stats.placement_failures
    );
}

fn finish_demo(
    frames: Res<FrameCount>,
    populator: Res<ChunkPopulator>,
    mut exit: EventWriter<AppExit>,
) {
    if frames.0 >= DEMO_FRAMES && populator.is_ready() && !populator.is_batch_active() {
        info!("Demo finished after {} frames", frames.0);
        exit.send(AppExit::Success);
    }
}
