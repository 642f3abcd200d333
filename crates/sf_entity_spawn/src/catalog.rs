//! Spawn definitions and the catalog they live in.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Probability of a definition spawning as a function of distance from the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChanceCurve {
    /// Same chance everywhere.
    Constant(f32),
    /// Linear blend from `from` at `near` to `to` at `far`, flat outside that band.
    Ramp { near: f32, far: f32, from: f32, to: f32 },
    /// Piecewise-linear `(distance, chance)` keys sorted by distance.
    Keyframes(Vec<(f32, f32)>),
}

impl ChanceCurve {
    /// Chance at `distance`, clamped to `[0, 1]`.
    pub fn evaluate(&self, distance: f32) -> f32 {
        let chance = match self {
            Self::Constant(chance) => *chance,
            Self::Ramp { near, far, from, to } => {
                if distance <= *near {
                    *from
                } else if distance >= *far {
                    *to
                } else {
                    let t = (distance - near) / (far - near);
                    from + (to - from) * t
                }
            }
            Self::Keyframes(keys) => sample_keyframes(keys, distance),
        };
        chance.clamp(0.0, 1.0)
    }

    fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::Constant(chance) => {
                if !chance.is_finite() {
                    return Err("chance is not finite");
                }
            }
            Self::Ramp { near, far, from, to } => {
                if ![*near, *far, *from, *to].iter().all(|v| v.is_finite()) {
                    return Err("ramp values must be finite");
                }
                if near > far {
                    return Err("ramp near distance exceeds far distance");
                }
            }
            Self::Keyframes(keys) => {
                if keys.iter().any(|(d, c)| !d.is_finite() || !c.is_finite()) {
                    return Err("keyframe values must be finite");
                }
                if keys.windows(2).any(|pair| pair[0].0 > pair[1].0) {
                    return Err("keyframes must be sorted by distance");
                }
                let rising = keys.windows(2).all(|pair| pair[0].1 <= pair[1].1);
                let falling = keys.windows(2).all(|pair| pair[0].1 >= pair[1].1);
                if !rising && !falling {
                    return Err("keyframe chances must only rise or only fall with distance");
                }
            }
        }
        Ok(())
    }
}

fn sample_keyframes(keys: &[(f32, f32)], distance: f32) -> f32 {
    let Some(&(first_distance, first_chance)) = keys.first() else {
        return 0.0;
    };
    if distance <= first_distance {
        return first_chance;
    }

    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if distance <= b.0 {
            if b.0 <= a.0 {
                return b.1;
            }
            let t = (distance - a.0) / (b.0 - a.0);
            return a.1 + (b.1 - a.1) * t;
        }
    }

    keys.last().map_or(0.0, |&(_, chance)| chance)
}

/// Where instances are placed inside their chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnPosition {
    /// Uniformly inside the chunk bounds.
    #[default]
    Random,
    /// On the chunk centre.
    Center,
}

/// Inclusive range of instances placed per chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnCount {
    pub min: u32,
    pub max: u32,
}

impl SpawnCount {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Draw a count uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max.max(self.min))
    }
}

impl Default for SpawnCount {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// A kind of content that can be placed in chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDefinition {
    /// Unique key.
    pub name: String,
    /// Sort order only; lower rarities are evaluated first.
    #[serde(default)]
    pub rarity: u32,
    /// Distance to chance mapping.
    pub chance: ChanceCurve,
    #[serde(default)]
    pub count: SpawnCount,
    /// Permanently excluded from selection.
    #[serde(default)]
    pub ignore: bool,
    /// Member of the mutually exclusive category: at most one per chunk.
    #[serde(default)]
    pub space_priority: bool,
    /// Chance is zero closer to the origin than this.
    #[serde(default)]
    pub min_spawn_distance: f32,
    #[serde(default)]
    pub position: SpawnPosition,
    /// Asset path handed to the spawner. Without one the definition cannot be placed.
    #[serde(default)]
    pub template: Option<String>,
}

impl SpawnDefinition {
    /// A common, non-priority definition placing one instance at a random point.
    /// The template defaults to the definition name.
    pub fn new(name: impl Into<String>, chance: ChanceCurve) -> Self {
        let name = name.into();
        Self {
            template: Some(name.clone()),
            name,
            rarity: 0,
            chance,
            count: SpawnCount::default(),
            ignore: false,
            space_priority: false,
            min_spawn_distance: 0.0,
            position: SpawnPosition::Random,
        }
    }

    pub fn with_rarity(mut self, rarity: u32) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_count(mut self, min: u32, max: u32) -> Self {
        self.count = SpawnCount::new(min, max);
        self
    }

    pub fn with_min_distance(mut self, distance: f32) -> Self {
        self.min_spawn_distance = distance;
        self
    }

    pub fn with_position(mut self, position: SpawnPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn without_template(mut self) -> Self {
        self.template = None;
        self
    }

    pub fn priority(mut self) -> Self {
        self.space_priority = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Chance of spawning at `distance` from the origin.
    pub fn chance_at(&self, distance: f32) -> f32 {
        if distance < self.min_spawn_distance {
            0.0
        } else {
            self.chance.evaluate(distance)
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if self.count.min > self.count.max {
            return Err(CatalogError::InvertedCount {
                name: self.name.clone(),
                min: self.count.min,
                max: self.count.max,
            });
        }
        if !self.min_spawn_distance.is_finite() || self.min_spawn_distance < 0.0 {
            return Err(CatalogError::InvalidDistance {
                name: self.name.clone(),
            });
        }
        self.chance
            .validate()
            .map_err(|reason| CatalogError::InvalidCurve {
                name: self.name.clone(),
                reason,
            })
    }
}

/// Ordered, validated set of spawn definitions.
///
/// Sorted by rarity once during bootstrap and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SpawnCatalog {
    definitions: Vec<SpawnDefinition>,
    sorted: bool,
}

impl SpawnCatalog {
    pub fn new(definitions: Vec<SpawnDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            definition.validate()?;
            if !seen.insert(definition.name.as_str()) {
                return Err(CatalogError::DuplicateName(definition.name.clone()));
            }
        }
        Ok(Self {
            definitions,
            sorted: false,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnDefinition> {
        self.definitions.iter()
    }

    pub fn get(&self, name: &str) -> Option<&SpawnDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Stable sort by ascending rarity. Only the first call has any effect.
    pub(crate) fn sort_by_rarity(&mut self) {
        if self.sorted {
            return;
        }
        self.definitions.sort_by_key(|d| d.rarity);
        self.sorted = true;
    }
}

/// Reasons a catalog is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    EmptyName,
    DuplicateName(String),
    InvertedCount { name: String, min: u32, max: u32 },
    InvalidDistance { name: String },
    InvalidCurve { name: String, reason: &'static str },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "spawn definition has an empty name"),
            Self::DuplicateName(name) => write!(f, "duplicate spawn definition '{}'", name),
            Self::InvertedCount { name, min, max } => {
                write!(f, "'{}' has count range {}..={} with min above max", name, min, max)
            }
            Self::InvalidDistance { name } => {
                write!(f, "'{}' has a negative or non-finite minimum spawn distance", name)
            }
            Self::InvalidCurve { name, reason } => write!(f, "'{}': {}", name, reason),
        }
    }
}

impl std::error::Error for CatalogError {}
