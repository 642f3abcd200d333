use crate::catalog::SpawnDefinition;
use crate::placer::{ContentSpawner, EntityData};
use crate::populator::{BootstrapTask, ChunkPopulator};
use bevy::prelude::*;
use sf_core::{ring_border, ChunkCoords, Quadrant};

/// Populate one chunk.
#[derive(Event, Debug, Clone)]
pub struct FillChunkRequest {
    pub coords: ChunkCoords,
    pub exclude_priority: bool,
}

/// Queue chunks for the throttled batch filler.
#[derive(Event, Debug, Clone)]
pub struct EnqueueChunksRequest(pub Vec<ChunkCoords>);

/// Populate chunks immediately, without throttling.
#[derive(Event, Debug, Clone)]
pub struct InstantFillRequest(pub Vec<ChunkCoords>);

/// Place a named definition in the nearest chunk where it can appear.
#[derive(Event, Debug, Clone)]
pub struct SpawnNearOriginRequest {
    pub definition: String,
    pub data: Option<EntityData>,
}

/// Parent of every placed instance of one definition.
#[derive(Component, Debug, Clone)]
pub struct SpawnHolder {
    pub definition: String,
}

/// Marks an entity created by chunk population.
#[derive(Component, Debug, Clone)]
pub struct SpawnedContent {
    pub definition: String,
    pub template: String,
}

/// Keeps the chunks around an entity populated as it moves.
#[derive(Component, Debug, Clone)]
pub struct ChunkFiller {
    /// Rings of chunks around the current chunk to keep filled.
    pub radius: u32,
    pub last_chunk: Option<ChunkCoords>,
}

impl ChunkFiller {
    pub fn new(radius: u32) -> Self {
        Self {
            radius,
            last_chunk: None,
        }
    }
}

/// Bootstrap bookkeeping for the setup systems.
#[derive(Resource, Debug, Default)]
pub struct BootstrapProgress {
    pub reserved_quadrants: usize,
    pub catalog_prepared: bool,
}

/// Systems driving chunk population, in execution order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkPopulationSet;

/// [`ContentSpawner`] backed by [`Commands`].
pub struct CommandSpawner<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
}

impl<'a, 'w, 's> CommandSpawner<'a, 'w, 's> {
    pub fn new(commands: &'a mut Commands<'w, 's>) -> Self {
        Self { commands }
    }
}

impl ContentSpawner for CommandSpawner<'_, '_, '_> {
    fn spawn_holder(&mut self, definition: &SpawnDefinition) -> Entity {
        self.commands
            .spawn((
                Name::new(format!("{} holder", definition.name)),
                SpawnHolder {
                    definition: definition.name.clone(),
                },
                Transform::default(),
                Visibility::default(),
            ))
            .id()
    }

    fn instantiate(
        &mut self,
        definition: &SpawnDefinition,
        template: &str,
        position: Vec2,
        holder: Entity,
    ) -> Entity {
        self.commands
            .spawn((
                Name::new(definition.name.clone()),
                SpawnedContent {
                    definition: definition.name.clone(),
                    template: template.to_string(),
                },
                Transform::from_translation(position.extend(0.0)),
                Visibility::default(),
            ))
            .set_parent(holder)
            .id()
    }

    fn apply_data(&mut self, entity: Entity, data: &EntityData) {
        self.commands.entity(entity).insert(data.clone());
    }
}

/// Run condition: every quadrant has been reserved.
pub fn registry_reserved(progress: Res<BootstrapProgress>) -> bool {
    progress.reserved_quadrants >= Quadrant::all().len()
}

/// Reserve the fill registry one quadrant per frame.
pub fn reserve_fill_registry(
    mut commands: Commands,
    mut populator: ResMut<ChunkPopulator>,
    mut progress: ResMut<BootstrapProgress>,
) {
    let Some(&quadrant) = Quadrant::all().get(progress.reserved_quadrants) else {
        return;
    };
    populator.reserve_quadrant(quadrant);
    progress.reserved_quadrants += 1;

    if progress.reserved_quadrants == Quadrant::all().len() {
        let mut spawner = CommandSpawner::new(&mut commands);
        populator.report_task_complete(BootstrapTask::ReserveRegistry, &mut spawner);
    }
}

/// Sort the catalog and create holders.
pub fn prepare_catalog(
    mut commands: Commands,
    mut populator: ResMut<ChunkPopulator>,
    mut progress: ResMut<BootstrapProgress>,
) {
    if progress.catalog_prepared {
        return;
    }
    let mut spawner = CommandSpawner::new(&mut commands);
    populator.prepare_catalog(&mut spawner);
    progress.catalog_prepared = true;
    populator.report_task_complete(BootstrapTask::PrepareCatalog, &mut spawner);
}

/// Forward request events to the populator.
pub fn handle_fill_requests(
    mut commands: Commands,
    mut populator: ResMut<ChunkPopulator>,
    mut fills: EventReader<FillChunkRequest>,
    mut batches: EventReader<EnqueueChunksRequest>,
    mut instant: EventReader<InstantFillRequest>,
    mut named: EventReader<SpawnNearOriginRequest>,
) {
    let mut spawner = CommandSpawner::new(&mut commands);
    for request in fills.read() {
        populator.fill_chunk(request.coords, request.exclude_priority, &mut spawner);
    }
    for EnqueueChunksRequest(coords) in batches.read() {
        populator.enqueue_batch(coords.clone(), &mut spawner);
    }
    for InstantFillRequest(coords) in instant.read() {
        populator.instant_fill_batch(coords.clone(), &mut spawner);
    }
    for request in named.read() {
        populator.spawn_near_origin(request.definition.clone(), request.data.clone(), &mut spawner);
    }
}

/// Queue the chunks around every filler that entered a new chunk.
pub fn enqueue_around_fillers(
    mut commands: Commands,
    mut populator: ResMut<ChunkPopulator>,
    mut fillers: Query<(&Transform, &mut ChunkFiller)>,
) {
    let chunk_size = populator.config().chunk_size;
    let mut spawner = CommandSpawner::new(&mut commands);

    for (transform, mut filler) in &mut fillers {
        let Some(current) = ChunkCoords::from_world(transform.translation.truncate(), chunk_size)
        else {
            continue;
        };
        if filler.last_chunk == Some(current) {
            continue;
        }
        filler.last_chunk = Some(current);

        let mut chunks = Vec::new();
        for radius in 0..=filler.radius {
            ring_border(current, radius, &mut chunks);
        }
        populator.enqueue_batch(chunks, &mut spawner);
    }
}

/// Advance the batch run by one step.
pub fn drain_fill_queue(mut commands: Commands, mut populator: ResMut<ChunkPopulator>) {
    let mut spawner = CommandSpawner::new(&mut commands);
    if let Some(progress) = populator.tick(&mut spawner) {
        if progress.finished {
            debug!(
                "Batch fill drained, {} chunks filled so far",
                populator.stats().chunks_filled
            );
        }
    }
}
