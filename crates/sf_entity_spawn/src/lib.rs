use bevy::prelude::*;

pub mod catalog;
pub mod config;
pub mod gate;
pub mod placer;
pub mod populator;
pub mod registry;
pub mod search;
pub mod selector;
pub mod systems;

pub use catalog::{CatalogError, ChanceCurve, SpawnCatalog, SpawnCount, SpawnDefinition, SpawnPosition};
pub use config::{ConfigError, SpawnConfig, MAX_RESERVE_SIZE};
pub use gate::ReadinessGate;
pub use placer::{ContentSpawner, EntityData, HolderMap, PlacementError, Placer};
pub use populator::{BatchProgress, BootstrapTask, ChunkPopulator, FillStats};
pub use registry::{FillRegistry, FillSnapshot};
pub use systems::{
    BootstrapProgress, ChunkFiller, ChunkPopulationSet, CommandSpawner, EnqueueChunksRequest,
    FillChunkRequest, InstantFillRequest, SpawnHolder, SpawnNearOriginRequest, SpawnedContent,
};

/// Chunk population plugin for Starfill.
/// Bootstraps the fill registry and catalog, then fills chunks on request and around fillers.
pub struct SfEntitySpawnPlugin {
    config: SpawnConfig,
    catalog: SpawnCatalog,
}

impl SfEntitySpawnPlugin {
    pub fn new(config: SpawnConfig, catalog: SpawnCatalog) -> Self {
        Self { config, catalog }
    }
}

impl Plugin for SfEntitySpawnPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ChunkPopulator::new(self.config.clone(), self.catalog.clone()))
            .init_resource::<BootstrapProgress>()
            .add_event::<FillChunkRequest>()
            .add_event::<EnqueueChunksRequest>()
            .add_event::<InstantFillRequest>()
            .add_event::<SpawnNearOriginRequest>()
            .add_systems(
                Update,
                (
                    systems::reserve_fill_registry.run_if(not(systems::registry_reserved)),
                    systems::prepare_catalog,
                    systems::handle_fill_requests,
                    systems::enqueue_around_fillers,
                    systems::drain_fill_queue,
                )
                    .chain()
                    .in_set(ChunkPopulationSet),
            );
    }
}
