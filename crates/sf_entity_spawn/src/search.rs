use crate::catalog::SpawnDefinition;
use crate::config::SpawnConfig;
use crate::registry::FillRegistry;
use sf_core::{ring_border, ChunkCoords};

/// Nearest unfilled chunk around the origin where `definition` has a non-zero chance.
///
/// Rings start at the radius implied by the definition's minimum spawn distance
/// and expand up to `ring_search_limit` times.
pub fn closest_valid_unfilled(
    registry: &FillRegistry,
    definition: &SpawnDefinition,
    config: &SpawnConfig,
) -> Option<ChunkCoords> {
    let size = config.chunk_size;
    let start = ((definition.min_spawn_distance + size * 0.5) / size).floor() as u32;
    let mut ring = Vec::new();

    // Ring `r` around the origin reaches local index `r - 1` at best.
    let last_useful_radius = u64::from(config.max_chunk_index) + 1;

    for step in 0..config.ring_search_limit {
        let radius = start.checked_add(step)?;
        if u64::from(radius) > last_useful_radius {
            return None;
        }
        ring.clear();
        ring_border(ChunkCoords::ORIGIN, radius, &mut ring);
        let found = ring.iter().copied().find(|&coords| {
            config.accepts(coords)
                && !registry.is_filled(coords)
                && definition.chance_at(coords.distance_from_origin(size)) > 0.0
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Nearest never-filled chunk spiralling out from `origin`, the origin itself first.
pub fn nearby_empty_chunk(
    registry: &FillRegistry,
    origin: ChunkCoords,
    config: &SpawnConfig,
) -> Option<ChunkCoords> {
    let mut ring = Vec::new();
    for radius in 0..config.spiral_ring_limit {
        ring.clear();
        ring_border(origin, radius, &mut ring);
        let found = ring
            .iter()
            .copied()
            .find(|&coords| config.accepts(coords) && !registry.is_filled(coords));
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ChanceCurve;
    use sf_core::Quadrant;

    fn fill_square(registry: &mut FillRegistry, radius: i64) {
        for sx in -radius..=radius {
            for sy in -radius..=radius {
                registry.mark_filled(ChunkCoords::from_signed(sx, sy).unwrap());
            }
        }
    }

    #[test]
    fn closest_starts_at_min_distance_ring() {
        let registry = FillRegistry::new();
        let config = SpawnConfig::default();
        let definition =
            SpawnDefinition::new("far", ChanceCurve::Constant(1.0)).with_min_distance(25.0);
        // (25 + 5) / 10 = 3, and the first cell of ring 3 is its lower-left corner.
        let found = closest_valid_unfilled(&registry, &definition, &config).unwrap();
        assert_eq!(found.to_signed(), (-3, -3));
    }

    #[test]
    fn closest_skips_filled_chunks() {
        let mut registry = FillRegistry::new();
        fill_square(&mut registry, 1);
        let config = SpawnConfig::default();
        let definition = SpawnDefinition::new("rock", ChanceCurve::Constant(1.0));
        let found = closest_valid_unfilled(&registry, &definition, &config).unwrap();
        assert_eq!(found.to_signed(), (-2, -2));
    }

    #[test]
    fn closest_gives_up_after_ring_limit() {
        let registry = FillRegistry::new();
        let config = SpawnConfig::default();
        let never = SpawnDefinition::new("never", ChanceCurve::Constant(0.0));
        assert_eq!(closest_valid_unfilled(&registry, &never, &config), None);

        let mut registry = FillRegistry::new();
        let config = SpawnConfig {
            ring_search_limit: 3,
            ..Default::default()
        };
        fill_square(&mut registry, 2);
        let rock = SpawnDefinition::new("rock", ChanceCurve::Constant(1.0));
        assert_eq!(closest_valid_unfilled(&registry, &rock, &config), None);
    }

    #[test]
    fn closest_stops_at_extent() {
        let registry = FillRegistry::new();
        let config = SpawnConfig::default();
        let remote =
            SpawnDefinition::new("remote", ChanceCurve::Constant(1.0)).with_min_distance(1e8);
        assert_eq!(closest_valid_unfilled(&registry, &remote, &config), None);

        let config = SpawnConfig {
            max_chunk_index: 2,
            ..Default::default()
        };
        // Ring 3 still reaches local index 2 on its negative sides.
        let edge = SpawnDefinition::new("edge", ChanceCurve::Constant(1.0)).with_min_distance(25.0);
        let found = closest_valid_unfilled(&registry, &edge, &config).unwrap();
        assert_eq!(found.to_signed(), (-3, -3));

        let beyond =
            SpawnDefinition::new("beyond", ChanceCurve::Constant(1.0)).with_min_distance(35.0);
        assert_eq!(closest_valid_unfilled(&registry, &beyond, &config), None);
    }

    #[test]
    fn closest_respects_chance_by_distance() {
        let registry = FillRegistry::new();
        let config = SpawnConfig::default();
        // Zero chance until 40 units out.
        let definition = SpawnDefinition::new(
            "outer",
            ChanceCurve::Ramp {
                near: 40.0,
                far: 80.0,
                from: 0.0,
                to: 1.0,
            },
        );
        let found = closest_valid_unfilled(&registry, &definition, &config).unwrap();
        assert!(found.distance_from_origin(config.chunk_size) > 40.0);
    }

    #[test]
    fn nearby_returns_origin_when_empty() {
        let registry = FillRegistry::new();
        let origin = ChunkCoords::new(Quadrant::UpLeft, 4, 4);
        let config = SpawnConfig::default();
        assert_eq!(nearby_empty_chunk(&registry, origin, &config), Some(origin));
    }

    #[test]
    fn nearby_walks_rings_in_order() {
        let mut registry = FillRegistry::new();
        registry.mark_filled(ChunkCoords::ORIGIN);
        registry.mark_filled(ChunkCoords::from_signed(-1, -1).unwrap());
        let config = SpawnConfig::default();
        let found = nearby_empty_chunk(&registry, ChunkCoords::ORIGIN, &config).unwrap();
        assert_eq!(found.to_signed(), (-1, 0));

        fill_square(&mut registry, 1);
        let found = nearby_empty_chunk(&registry, ChunkCoords::ORIGIN, &config).unwrap();
        assert_eq!(found.to_signed(), (-2, -2));
    }

    #[test]
    fn nearby_is_bounded() {
        let mut registry = FillRegistry::new();
        fill_square(&mut registry, 1);
        let config = SpawnConfig {
            spiral_ring_limit: 2,
            ..Default::default()
        };
        assert_eq!(nearby_empty_chunk(&registry, ChunkCoords::ORIGIN, &config), None);
    }

    #[test]
    fn chunks_beyond_extent_are_skipped() {
        let registry = FillRegistry::new();
        let config = SpawnConfig {
            max_chunk_index: 2,
            ..Default::default()
        };
        let origin = ChunkCoords::new(Quadrant::UpRight, 3, 0);
        let found = nearby_empty_chunk(&registry, origin, &config).unwrap();
        assert!(config.accepts(found));
        assert_eq!(found.to_signed(), (2, -1));
    }
}
