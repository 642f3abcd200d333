use serde::{Deserialize, Serialize};
use sf_core::{ChunkCoords, DEFAULT_CHUNK_SIZE};

/// Largest block reserved per quadrant while bootstrapping.
pub const MAX_RESERVE_SIZE: u32 = 1024;

/// Tuning parameters for chunk population.
///
/// Loaded from RON; missing fields fall back to [`SpawnConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Side length of a chunk in world units.
    pub chunk_size: f32,
    /// Chunks filled per frame by the batch filler.
    pub max_chunk_batch_fill: usize,
    /// Rows and columns pre-allocated per quadrant while bootstrapping.
    pub reserve_size: u32,
    /// Rings scanned by the closest-valid-chunk search before giving up.
    pub ring_search_limit: u32,
    /// Rings scanned by the nearby-empty-chunk spiral before giving up.
    pub spiral_ring_limit: u32,
    /// Largest local chunk index accepted by fill and search operations.
    pub max_chunk_index: u32,
    /// Seed for spawn selection and placement.
    pub rng_seed: u64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunk_batch_fill: 5,
            reserve_size: 32,
            ring_search_limit: 100,
            spiral_ring_limit: 4096,
            max_chunk_index: 1 << 16,
            rng_seed: 0x5EED,
        }
    }
}

impl SpawnConfig {
    /// Check that the values can drive the populator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.chunk_size.is_finite() || self.chunk_size <= 0.0 {
            return Err(ConfigError::ChunkSize(self.chunk_size));
        }
        if self.max_chunk_batch_fill == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if self.ring_search_limit == 0 || self.spiral_ring_limit == 0 {
            return Err(ConfigError::EmptySearch);
        }
        let reserve_limit = u64::from(MAX_RESERVE_SIZE).min(u64::from(self.max_chunk_index) + 1);
        if u64::from(self.reserve_size) > reserve_limit {
            return Err(ConfigError::ReserveTooLarge {
                reserve_size: self.reserve_size,
                limit: reserve_limit,
            });
        }
        Ok(())
    }

    /// Whether `coords` lies inside the accepted chunk extent.
    pub fn accepts(&self, coords: ChunkCoords) -> bool {
        coords.max_local_index() <= self.max_chunk_index
    }
}

/// Reasons a [`SpawnConfig`] is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ChunkSize(f32),
    EmptyBatch,
    EmptySearch,
    ReserveTooLarge { reserve_size: u32, limit: u64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChunkSize(size) => write!(f, "chunk size must be positive and finite, got {}", size),
            Self::EmptyBatch => write!(f, "max_chunk_batch_fill must be at least 1"),
            Self::EmptySearch => write!(f, "search ring limits must be at least 1"),
            Self::ReserveTooLarge { reserve_size, limit } => {
                write!(f, "reserve_size {} exceeds the limit of {}", reserve_size, limit)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::Quadrant;

    #[test]
    fn defaults_are_valid() {
        assert!(SpawnConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_values() {
        let config = SpawnConfig {
            chunk_size: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ChunkSize(0.0)));

        let config = SpawnConfig {
            max_chunk_batch_fill: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyBatch));
    }

    #[test]
    fn reserve_is_bounded() {
        let config = SpawnConfig {
            reserve_size: 100_000,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ReserveTooLarge {
                reserve_size: 100_000,
                limit: u64::from(MAX_RESERVE_SIZE)
            })
        );

        // A reserve may cover the whole extent but not go past it.
        let config = SpawnConfig {
            reserve_size: 9,
            max_chunk_index: 8,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        let config = SpawnConfig {
            reserve_size: 10,
            ..config
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ReserveTooLarge {
                reserve_size: 10,
                limit: 9
            })
        );
    }

    #[test]
    fn extent_check_uses_largest_axis() {
        let config = SpawnConfig {
            max_chunk_index: 10,
            ..Default::default()
        };
        assert!(config.accepts(ChunkCoords::new(Quadrant::UpLeft, 10, 3)));
        assert!(!config.accepts(ChunkCoords::new(Quadrant::UpLeft, 3, 11)));
    }
}
