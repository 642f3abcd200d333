use bevy::prelude::*;
use sf_entity_spawn::ChunkPopulator;
use std::path::PathBuf;

pub mod fill_io;

pub use fill_io::{
    load_catalog, load_config, load_fill_state, save_fill_state, save_path, SpawnIoError,
    SAVES_DIR, SPAWN_DIR,
};

/// Where the fill state is read from on startup and written to on exit.
#[derive(Resource, Debug, Clone)]
pub struct FillStatePath(pub PathBuf);

/// Persistence plugin for Starfill.
/// Restores which chunks were filled in earlier sessions and saves them again on exit.
pub struct SfPersistencePlugin {
    path: PathBuf,
}

impl SfPersistencePlugin {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Plugin for SfPersistencePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(FillStatePath(self.path.clone()))
            .add_systems(Startup, restore_fill_state)
            .add_systems(Last, save_fill_state_on_exit);
    }
}

/// Merge the saved fill state into the populator, if a save exists.
pub fn restore_fill_state(path: Res<FillStatePath>, mut populator: ResMut<ChunkPopulator>) {
    if !path.0.exists() {
        info!("No fill state at {}, starting fresh", path.0.display());
        return;
    }
    match load_fill_state(&path.0) {
        Ok(snapshot) => {
            populator.restore(&snapshot);
        }
        Err(e) => error!("Failed to load fill state from {}: {}", path.0.display(), e),
    }
}

/// Write the fill state when the app is asked to exit.
pub fn save_fill_state_on_exit(
    mut exits: EventReader<AppExit>,
    path: Res<FillStatePath>,
    populator: Res<ChunkPopulator>,
) {
    if exits.read().last().is_none() {
        return;
    }
    let snapshot = populator.snapshot();
    match save_fill_state(&path.0, &snapshot) {
        Ok(()) => info!(
            "Saved {} filled chunks to {}",
            snapshot.filled.len(),
            path.0.display()
        ),
        Err(e) => error!("Failed to save fill state to {}: {}", path.0.display(), e),
    }
}
