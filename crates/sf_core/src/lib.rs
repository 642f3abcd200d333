//! Chunk-space types shared by the Starfill crates.

pub mod coords;

pub use coords::{
    ring_border, ChunkBounds, ChunkCoords, Quadrant, DEFAULT_CHUNK_SIZE, QUADRANT_COUNT,
};
