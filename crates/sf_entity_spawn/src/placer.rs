use crate::catalog::{SpawnDefinition, SpawnPosition};
use bevy::math::Vec2;
use bevy::prelude::{Component, Entity};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sf_core::ChunkCoords;
use std::collections::{BTreeMap, HashMap};

/// Creates the entities that make up placed content.
pub trait ContentSpawner {
    /// Create the parent entity grouping every instance of `definition`.
    fn spawn_holder(&mut self, definition: &SpawnDefinition) -> Entity;

    /// Create one instance of `definition` from `template` at `position`, parented to `holder`.
    fn instantiate(
        &mut self,
        definition: &SpawnDefinition,
        template: &str,
        position: Vec2,
        holder: Entity,
    ) -> Entity;

    /// Attach a payload to a freshly created instance.
    fn apply_data(&mut self, entity: Entity, data: &EntityData);
}

/// Per-instance payload applied after instantiation.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, f32>,
}

impl EntityData {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: f32) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Reasons content could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    MissingTemplate { definition: String },
    UnknownDefinition { name: String },
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTemplate { definition } => {
                write!(f, "spawn definition '{}' has no template to instantiate", definition)
            }
            Self::UnknownDefinition { name } => write!(f, "no spawn definition named '{}'", name),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Holder entity per definition name.
#[derive(Debug, Default)]
pub struct HolderMap {
    holders: HashMap<String, Entity>,
}

impl HolderMap {
    /// Holder for `definition`, creating it through `spawner` on first use.
    pub fn get_or_spawn(
        &mut self,
        definition: &SpawnDefinition,
        spawner: &mut dyn ContentSpawner,
    ) -> Entity {
        if let Some(&holder) = self.holders.get(&definition.name) {
            return holder;
        }
        let holder = spawner.spawn_holder(definition);
        self.holders.insert(definition.name.clone(), holder);
        holder
    }

    pub fn get(&self, name: &str) -> Option<Entity> {
        self.holders.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}

/// Resolves instance counts and positions and hands them to a [`ContentSpawner`].
pub struct Placer<'a, R: Rng + ?Sized> {
    pub rng: &'a mut R,
    pub holders: &'a mut HolderMap,
    pub chunk_size: f32,
}

impl<'a, R: Rng + ?Sized> Placer<'a, R> {
    /// Place between `count.min` and `count.max` instances of `definition` in `coords`.
    pub fn spawn_in_chunk(
        &mut self,
        definition: &SpawnDefinition,
        data: Option<&EntityData>,
        coords: ChunkCoords,
        spawner: &mut dyn ContentSpawner,
    ) -> Result<Vec<Entity>, PlacementError> {
        let template = definition
            .template
            .as_deref()
            .ok_or_else(|| PlacementError::MissingTemplate {
                definition: definition.name.clone(),
            })?;

        let count = definition.count.sample(&mut *self.rng);
        let holder = self.holders.get_or_spawn(definition, spawner);
        let mut spawned = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let position = self.resolve_position(definition.position, coords);
            let entity = spawner.instantiate(definition, template, position, holder);
            if let Some(data) = data {
                spawner.apply_data(entity, data);
            }
            spawned.push(entity);
        }
        Ok(spawned)
    }

    fn resolve_position(&mut self, strategy: SpawnPosition, coords: ChunkCoords) -> Vec2 {
        match strategy {
            SpawnPosition::Center => coords.center(self.chunk_size),
            SpawnPosition::Random => {
                let bounds = coords.bounds(self.chunk_size);
                let offset = Vec2::new(self.rng.gen::<f32>(), self.rng.gen::<f32>());
                bounds.min + offset * bounds.size()
            }
        }
    }
}
