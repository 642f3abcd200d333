use crate::catalog::{SpawnCatalog, SpawnDefinition};
use crate::config::SpawnConfig;
use crate::gate::ReadinessGate;
use crate::placer::{ContentSpawner, EntityData, HolderMap, PlacementError, Placer};
use crate::registry::{FillRegistry, FillSnapshot};
use crate::search;
use crate::selector::choose;
use bevy::log::{debug, error, info, warn};
use bevy::prelude::{Entity, Resource};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sf_core::{ChunkCoords, Quadrant};
use std::collections::VecDeque;

/// Setup work that must finish before any chunk is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BootstrapTask {
    /// Pre-allocate the fill registry around the origin.
    ReserveRegistry,
    /// Sort the catalog and create the holder entities.
    PrepareCatalog,
}

impl BootstrapTask {
    /// Returns all tasks in index order.
    pub fn all() -> &'static [BootstrapTask] {
        &[Self::ReserveRegistry, Self::PrepareCatalog]
    }

    /// Index of the task's readiness flag.
    pub fn index(&self) -> usize {
        match self {
            Self::ReserveRegistry => 0,
            Self::PrepareCatalog => 1,
        }
    }
}

/// Callback run once the populator is ready.
pub type Listener = Box<dyn FnOnce(&mut ChunkPopulator, &mut dyn ContentSpawner) + Send + Sync>;

/// A call held back until bootstrap has finished.
pub enum Deferred {
    Fill {
        coords: ChunkCoords,
        exclude_priority: bool,
    },
    EnqueueBatch(Vec<ChunkCoords>),
    InstantFill(Vec<ChunkCoords>),
    SpawnNearOrigin {
        definition: String,
        data: Option<EntityData>,
    },
    Listener(Listener),
}

/// Progress of the current batch run after one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchProgress {
    pub processed: usize,
    /// Chunks populated by this tick; repeats and rejected chunks are not counted.
    pub filled: usize,
    pub remaining: usize,
    /// The queue drained and the run ended.
    pub finished: bool,
}

/// Running totals, mostly for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillStats {
    pub chunks_filled: usize,
    pub entities_placed: usize,
    pub placement_failures: usize,
    pub rejected: usize,
}

/// Owns everything needed to populate chunks exactly once.
///
/// Every generation entry point goes through the readiness gate: before the
/// bootstrap tasks have reported in, calls are queued and replayed in order.
/// Searches made before readiness report nothing.
#[derive(Resource)]
pub struct ChunkPopulator {
    config: SpawnConfig,
    registry: FillRegistry,
    catalog: SpawnCatalog,
    gate: ReadinessGate<Deferred>,
    batch: Option<VecDeque<ChunkCoords>>,
    holders: HolderMap,
    rng: ChaCha8Rng,
    stats: FillStats,
}

impl ChunkPopulator {
    /// The config is expected to have passed [`SpawnConfig::validate`].
    pub fn new(config: SpawnConfig, catalog: SpawnCatalog) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            config,
            registry: FillRegistry::new(),
            catalog,
            gate: ReadinessGate::new(BootstrapTask::all().len()),
            batch: None,
            holders: HolderMap::default(),
            rng,
            stats: FillStats::default(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn registry(&self) -> &FillRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &SpawnCatalog {
        &self.catalog
    }

    pub fn stats(&self) -> FillStats {
        self.stats
    }

    pub fn holder(&self, definition: &str) -> Option<Entity> {
        self.holders.get(definition)
    }

    /// Calls waiting for readiness.
    pub fn deferred_len(&self) -> usize {
        self.gate.deferred_len()
    }

    pub fn is_batch_active(&self) -> bool {
        self.batch.is_some()
    }

    /// Chunks waiting in the current batch run.
    pub fn pending_len(&self) -> usize {
        self.batch.as_ref().map_or(0, VecDeque::len)
    }

    /// Bootstrap step: reserve the configured block in one quadrant.
    pub fn reserve_quadrant(&mut self, quadrant: Quadrant) {
        self.registry.reserve(quadrant, self.config.reserve_size);
    }

    /// Bootstrap step: sort the catalog by rarity and create one holder per definition.
    pub fn prepare_catalog(&mut self, spawner: &mut dyn ContentSpawner) {
        self.catalog.sort_by_rarity();
        for definition in self.catalog.iter() {
            self.holders.get_or_spawn(definition, spawner);
        }
        info!(
            "Prepared {} spawn definitions with {} holders",
            self.catalog.len(),
            self.holders.len()
        );
    }

    /// Record a finished bootstrap task. Completing the last one replays every deferred call.
    pub fn report_task_complete(&mut self, task: BootstrapTask, spawner: &mut dyn ContentSpawner) {
        if !self.gate.complete(task.index()) {
            return;
        }
        info!(
            "Chunk population ready, replaying {} deferred calls",
            self.gate.deferred_len()
        );
        while let Some(action) = self.gate.next_deferred() {
            self.execute(action, spawner);
        }
    }

    /// Run `listener` now if ready, otherwise once bootstrap completes.
    pub fn add_listener<F>(&mut self, listener: F, spawner: &mut dyn ContentSpawner)
    where
        F: FnOnce(&mut ChunkPopulator, &mut dyn ContentSpawner) + Send + Sync + 'static,
    {
        self.submit(Deferred::Listener(Box::new(listener)), spawner);
    }

    /// Populate one chunk unless it was populated before.
    pub fn fill_chunk(
        &mut self,
        coords: ChunkCoords,
        exclude_priority: bool,
        spawner: &mut dyn ContentSpawner,
    ) {
        self.submit(
            Deferred::Fill {
                coords,
                exclude_priority,
            },
            spawner,
        );
    }

    /// Queue chunks for the throttled batch filler. Duplicates are kept.
    pub fn enqueue_batch(&mut self, coords: Vec<ChunkCoords>, spawner: &mut dyn ContentSpawner) {
        self.submit(Deferred::EnqueueBatch(coords), spawner);
    }

    /// Fill every chunk immediately, in order.
    pub fn instant_fill_batch(
        &mut self,
        coords: Vec<ChunkCoords>,
        spawner: &mut dyn ContentSpawner,
    ) {
        self.submit(Deferred::InstantFill(coords), spawner);
    }

    /// Place the named definition in the nearest unfilled chunk where it may appear.
    pub fn spawn_near_origin(
        &mut self,
        definition: impl Into<String>,
        data: Option<EntityData>,
        spawner: &mut dyn ContentSpawner,
    ) {
        self.submit(
            Deferred::SpawnNearOrigin {
                definition: definition.into(),
                data,
            },
            spawner,
        );
    }

    /// Nearest unfilled chunk with a non-zero chance for `definition`. `None` before readiness.
    pub fn closest_valid_unfilled_chunk(&self, definition: &SpawnDefinition) -> Option<ChunkCoords> {
        if !self.is_ready() {
            debug!("Closest-chunk search for '{}' before ready", definition.name);
            return None;
        }
        search::closest_valid_unfilled(&self.registry, definition, &self.config)
    }

    /// Nearest never-filled chunk around `origin`. `None` before readiness.
    pub fn nearby_empty_chunk(&self, origin: ChunkCoords) -> Option<ChunkCoords> {
        if !self.is_ready() {
            debug!("Nearby-empty search around {} before ready", origin);
            return None;
        }
        search::nearby_empty_chunk(&self.registry, origin, &self.config)
    }

    /// Advance the batch run by up to `max_chunk_batch_fill` chunks.
    pub fn tick(&mut self, spawner: &mut dyn ContentSpawner) -> Option<BatchProgress> {
        let queue = self.batch.as_mut()?;
        let take = self.config.max_chunk_batch_fill.min(queue.len());
        let chunks: Vec<ChunkCoords> = queue.drain(..take).collect();
        let remaining = queue.len();

        let mut filled = 0;
        for &coords in &chunks {
            if self.fill_now(coords, false, spawner) {
                filled += 1;
            }
        }

        let finished = remaining == 0;
        if finished {
            self.batch = None;
            debug!("Batch fill run finished");
        }
        Some(BatchProgress {
            processed: chunks.len(),
            filled,
            remaining,
            finished,
        })
    }

    /// Mark every chunk of a snapshot as filled. Returns how many were new.
    ///
    /// Entries outside the accepted chunk extent are dropped.
    pub fn restore(&mut self, snapshot: &FillSnapshot) -> usize {
        let (accepted, rejected): (Vec<_>, Vec<_>) = snapshot
            .filled
            .iter()
            .copied()
            .partition(|&coords| self.config.accepts(coords));
        if !rejected.is_empty() {
            warn!(
                "Dropped {} saved chunks outside the chunk extent",
                rejected.len()
            );
        }
        let restored = self.registry.restore(&FillSnapshot { filled: accepted });
        info!("Restored {} filled chunks", restored);
        restored
    }

    pub fn snapshot(&self) -> FillSnapshot {
        self.registry.snapshot()
    }

    fn submit(&mut self, action: Deferred, spawner: &mut dyn ContentSpawner) {
        if let Some(action) = self.gate.admit(action) {
            self.execute(action, spawner);
        }
    }

    fn execute(&mut self, action: Deferred, spawner: &mut dyn ContentSpawner) {
        match action {
            Deferred::Fill {
                coords,
                exclude_priority,
            } => {
                self.fill_now(coords, exclude_priority, spawner);
            }
            Deferred::EnqueueBatch(coords) => {
                let queue = self.batch.get_or_insert_with(|| {
                    debug!("Batch fill run started");
                    VecDeque::new()
                });
                queue.extend(coords);
            }
            Deferred::InstantFill(coords) => {
                for coords in coords {
                    self.fill_now(coords, false, spawner);
                }
            }
            Deferred::SpawnNearOrigin { definition, data } => {
                match self.place_near_origin(&definition, data.as_ref(), spawner) {
                    Ok(Some(coords)) => info!("Spawned '{}' near origin in {}", definition, coords),
                    Ok(None) => warn!("No valid unfilled chunk found for '{}'", definition),
                    Err(e) => error!("Failed to spawn '{}': {}", definition, e),
                }
            }
            Deferred::Listener(listener) => listener(self, spawner),
        }
    }

    /// Returns `true` if the chunk was populated by this call.
    fn fill_now(
        &mut self,
        coords: ChunkCoords,
        exclude_priority: bool,
        spawner: &mut dyn ContentSpawner,
    ) -> bool {
        if !self.config.accepts(coords) {
            debug!("Ignoring fill of {} outside the chunk extent", coords);
            self.stats.rejected += 1;
            return false;
        }

        self.registry.ensure_capacity(coords);
        if !self.registry.mark_filled(coords) {
            return false;
        }
        self.stats.chunks_filled += 1;

        let distance = coords.distance_from_origin(self.config.chunk_size);
        let chosen = choose(&self.catalog, distance, exclude_priority, &mut self.rng);
        let mut placer = Placer {
            rng: &mut self.rng,
            holders: &mut self.holders,
            chunk_size: self.config.chunk_size,
        };

        let mut placed = 0;
        for definition in chosen {
            match placer.spawn_in_chunk(definition, None, coords, spawner) {
                Ok(entities) => placed += entities.len(),
                Err(e) => {
                    error!("Failed to populate {}: {}", coords, e);
                    self.stats.placement_failures += 1;
                }
            }
        }
        self.stats.entities_placed += placed;
        debug!("Filled {} with {} entities", coords, placed);
        true
    }

    fn place_near_origin(
        &mut self,
        name: &str,
        data: Option<&EntityData>,
        spawner: &mut dyn ContentSpawner,
    ) -> Result<Option<ChunkCoords>, PlacementError> {
        let definition = self
            .catalog
            .get(name)
            .ok_or_else(|| PlacementError::UnknownDefinition {
                name: name.to_string(),
            })?;
        let Some(coords) = search::closest_valid_unfilled(&self.registry, definition, &self.config)
        else {
            return Ok(None);
        };

        let entities = Placer {
            rng: &mut self.rng,
            holders: &mut self.holders,
            chunk_size: self.config.chunk_size,
        }
        .spawn_in_chunk(definition, data, coords, spawner)?;
        self.stats.entities_placed += entities.len();
        Ok(Some(coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ChanceCurve, SpawnPosition};
    use crate::placer::tests::RecordingSpawner;
    use std::sync::{Arc, Mutex};

    fn catalog(definitions: Vec<SpawnDefinition>) -> SpawnCatalog {
        SpawnCatalog::new(definitions).unwrap()
    }

    fn ready(populator: &mut ChunkPopulator, spawner: &mut RecordingSpawner) {
        for &quadrant in Quadrant::all() {
            populator.reserve_quadrant(quadrant);
        }
        populator.report_task_complete(BootstrapTask::ReserveRegistry, spawner);
        populator.prepare_catalog(spawner);
        populator.report_task_complete(BootstrapTask::PrepareCatalog, spawner);
    }

    fn certain(name: &str) -> SpawnDefinition {
        SpawnDefinition::new(name, ChanceCurve::Constant(1.0))
    }

    fn signed(sx: i64, sy: i64) -> ChunkCoords {
        ChunkCoords::from_signed(sx, sy).unwrap()
    }

    #[test]
    fn task_indices_are_unique() {
        for (i, task) in BootstrapTask::all().iter().enumerate() {
            assert_eq!(task.index(), i);
        }
    }

    #[test]
    fn chunk_is_populated_once() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(SpawnConfig::default(), catalog(vec![certain("A")]));
        ready(&mut populator, &mut spawner);

        populator.fill_chunk(ChunkCoords::ORIGIN, false, &mut spawner);
        assert_eq!(spawner.placed_names(), ["A"]);

        populator.fill_chunk(ChunkCoords::ORIGIN, false, &mut spawner);
        assert_eq!(spawner.placed_names(), ["A"]);
        assert!(populator.registry().is_filled(ChunkCoords::ORIGIN));
        assert_eq!(populator.stats().chunks_filled, 1);
    }

    #[test]
    fn priority_definition_fills_alone() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(
            SpawnConfig::default(),
            catalog(vec![certain("A"), certain("B").priority()]),
        );
        ready(&mut populator, &mut spawner);

        for x in 0..20 {
            populator.fill_chunk(signed(x, 0), false, &mut spawner);
        }
        assert!(spawner.placed_names().iter().all(|&name| name == "B"));
        assert_eq!(spawner.placed.len(), 20);

        populator.fill_chunk(signed(0, 5), true, &mut spawner);
        assert_eq!(spawner.placed_names().last(), Some(&"A"));
    }

    #[test]
    fn calls_before_ready_are_replayed_in_order() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(
            SpawnConfig::default(),
            catalog(vec![certain("A").with_position(SpawnPosition::Center)]),
        );

        populator.fill_chunk(signed(2, 0), false, &mut spawner);
        populator.instant_fill_batch(vec![signed(-1, 0), signed(0, -1)], &mut spawner);
        populator.fill_chunk(signed(2, 0), false, &mut spawner);
        assert!(!populator.is_ready());
        assert_eq!(populator.deferred_len(), 3);
        assert!(spawner.placed.is_empty());
        assert!(!populator.registry().is_filled(signed(2, 0)));

        ready(&mut populator, &mut spawner);
        let centres: Vec<_> = spawner.placed.iter().map(|p| p.position).collect();
        assert_eq!(
            centres,
            vec![
                signed(2, 0).center(10.0),
                signed(-1, 0).center(10.0),
                signed(0, -1).center(10.0),
            ]
        );
        assert_eq!(populator.deferred_len(), 0);
    }

    #[test]
    fn nested_listeners_run_in_submission_order() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(SpawnConfig::default(), catalog(Vec::new()));
        let order = Arc::new(Mutex::new(Vec::new()));

        let log = order.clone();
        populator.add_listener(
            move |populator, spawner| {
                log.lock().unwrap().push(1);
                let inner = log.clone();
                populator.add_listener(move |_, _| inner.lock().unwrap().push(3), spawner);
            },
            &mut spawner,
        );
        let log = order.clone();
        populator.add_listener(move |_, _| log.lock().unwrap().push(2), &mut spawner);
        assert!(order.lock().unwrap().is_empty());

        ready(&mut populator, &mut spawner);
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);

        // Once ready, listeners run immediately.
        let log = order.clone();
        populator.add_listener(move |_, _| log.lock().unwrap().push(4), &mut spawner);
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn batch_run_is_throttled_and_fifo() {
        let mut spawner = RecordingSpawner::default();
        let config = SpawnConfig {
            max_chunk_batch_fill: 2,
            ..Default::default()
        };
        let mut populator = ChunkPopulator::new(
            config,
            catalog(vec![certain("A").with_position(SpawnPosition::Center)]),
        );
        ready(&mut populator, &mut spawner);

        let (c1, c2, c3, c4) = (signed(0, 0), signed(1, 0), signed(2, 0), signed(3, 0));
        populator.enqueue_batch(vec![c1, c2, c3], &mut spawner);
        assert!(populator.is_batch_active());
        assert!(spawner.placed.is_empty());

        let progress = populator.tick(&mut spawner).unwrap();
        assert_eq!(
            progress,
            BatchProgress {
                processed: 2,
                filled: 2,
                remaining: 1,
                finished: false
            }
        );
        assert!(populator.registry().is_filled(c1) && populator.registry().is_filled(c2));
        assert!(!populator.registry().is_filled(c3));

        let progress = populator.tick(&mut spawner).unwrap();
        assert!(progress.finished);
        assert!(populator.registry().is_filled(c3));
        assert!(!populator.is_batch_active());
        assert_eq!(populator.tick(&mut spawner), None);

        populator.enqueue_batch(vec![c4], &mut spawner);
        assert!(populator.is_batch_active());
        populator.tick(&mut spawner);
        let centres: Vec<_> = spawner.placed.iter().map(|p| p.position).collect();
        assert_eq!(
            centres,
            [c1, c2, c3, c4].map(|c| c.center(10.0)).to_vec()
        );
    }

    #[test]
    fn duplicate_batch_entries_fill_once() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(SpawnConfig::default(), catalog(vec![certain("A")]));
        ready(&mut populator, &mut spawner);

        populator.enqueue_batch(vec![ChunkCoords::ORIGIN; 3], &mut spawner);
        assert_eq!(populator.pending_len(), 3);
        let progress = populator.tick(&mut spawner).unwrap();
        assert_eq!((progress.processed, progress.filled), (3, 1));
        assert_eq!(spawner.placed.len(), 1);
    }

    #[test]
    fn out_of_extent_chunks_are_ignored() {
        let mut spawner = RecordingSpawner::default();
        let config = SpawnConfig {
            max_chunk_index: 4,
            ..Default::default()
        };
        let mut populator = ChunkPopulator::new(config, catalog(vec![certain("A")]));
        ready(&mut populator, &mut spawner);

        populator.fill_chunk(signed(5, 0), false, &mut spawner);
        assert!(spawner.placed.is_empty());
        assert!(!populator.registry().is_filled(signed(5, 0)));
        assert_eq!(populator.stats().rejected, 1);
    }

    #[test]
    fn placement_failure_does_not_block_other_definitions() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(
            SpawnConfig::default(),
            catalog(vec![certain("ghost").without_template(), certain("rock")]),
        );
        ready(&mut populator, &mut spawner);

        populator.instant_fill_batch(vec![signed(0, 0), signed(1, 1)], &mut spawner);
        assert_eq!(spawner.placed_names(), ["rock", "rock"]);
        assert_eq!(populator.stats().placement_failures, 2);
        assert_eq!(populator.stats().chunks_filled, 2);
    }

    #[test]
    fn prepare_creates_one_holder_per_definition() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(
            SpawnConfig::default(),
            catalog(vec![certain("b").with_rarity(3), certain("a").with_rarity(1)]),
        );
        ready(&mut populator, &mut spawner);

        let names: Vec<_> = spawner.holders.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(populator.holder("a"), Some(spawner.holders[0].1));
        assert!(populator.catalog().is_sorted());
    }

    #[test]
    fn searches_report_nothing_before_ready() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(SpawnConfig::default(), catalog(vec![certain("A")]));
        let definition = certain("A");
        assert_eq!(populator.closest_valid_unfilled_chunk(&definition), None);
        assert_eq!(populator.nearby_empty_chunk(ChunkCoords::ORIGIN), None);

        ready(&mut populator, &mut spawner);
        assert_eq!(
            populator.closest_valid_unfilled_chunk(&definition),
            Some(ChunkCoords::ORIGIN)
        );
        populator.fill_chunk(ChunkCoords::ORIGIN, false, &mut spawner);
        assert_eq!(
            populator.nearby_empty_chunk(ChunkCoords::ORIGIN),
            Some(signed(-1, -1))
        );
    }

    #[test]
    fn spawn_near_origin_places_named_definition() {
        let mut spawner = RecordingSpawner::default();
        let mut populator = ChunkPopulator::new(
            SpawnConfig::default(),
            catalog(vec![
                certain("rock"),
                SpawnDefinition::new("station", ChanceCurve::Constant(0.0))
                    .with_min_distance(30.0)
                    .with_position(SpawnPosition::Center),
                SpawnDefinition::new("outpost", ChanceCurve::Constant(1.0))
                    .with_min_distance(30.0)
                    .with_position(SpawnPosition::Center),
            ]),
        );

        let data = EntityData::labeled("home");
        populator.spawn_near_origin("outpost", Some(data.clone()), &mut spawner);
        assert!(spawner.placed.is_empty());
        ready(&mut populator, &mut spawner);

        // (30 + 5) / 10 = 3, so the search starts at ring 3.
        assert_eq!(spawner.placed_names(), ["outpost"]);
        assert_eq!(spawner.placed[0].position, signed(-3, -3).center(10.0));
        assert_eq!(spawner.data, vec![(spawner.placed[0].entity, data)]);

        // Unknown names and impossible definitions place nothing.
        populator.spawn_near_origin("missing", None, &mut spawner);
        populator.spawn_near_origin("station", None, &mut spawner);
        assert_eq!(spawner.placed.len(), 1);
    }

    #[test]
    fn restore_marks_snapshot_chunks_filled() {
        let mut spawner = RecordingSpawner::default();
        let mut source = ChunkPopulator::new(SpawnConfig::default(), catalog(vec![certain("A")]));
        ready(&mut source, &mut spawner);
        source.instant_fill_batch(vec![signed(0, 0), signed(-4, 2)], &mut spawner);

        let mut target = ChunkPopulator::new(SpawnConfig::default(), catalog(vec![certain("A")]));
        assert_eq!(target.restore(&source.snapshot()), 2);

        let mut fresh = RecordingSpawner::default();
        ready(&mut target, &mut fresh);
        target.fill_chunk(signed(-4, 2), false, &mut fresh);
        assert!(fresh.placed.is_empty());
    }

    #[test]
    fn restore_drops_chunks_outside_extent() {
        let config = SpawnConfig {
            max_chunk_index: 4,
            ..Default::default()
        };
        let mut populator = ChunkPopulator::new(config, catalog(vec![certain("A")]));
        let near = ChunkCoords::new(Quadrant::UpRight, 1, 1);
        let far = ChunkCoords::new(Quadrant::UpRight, 5000, 0);

        let restored = populator.restore(&FillSnapshot {
            filled: vec![far, near],
        });
        assert_eq!(restored, 1);
        assert!(populator.registry().is_filled(near));
        assert!(!populator.registry().is_filled(far));
        // The registry never grew towards the rejected entry.
        assert!(populator.registry().capacity(Quadrant::UpRight) < 5000);
    }
}
