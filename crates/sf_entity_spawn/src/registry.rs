use bevy::log::{debug, warn};
use serde::{Deserialize, Serialize};
use sf_core::{ChunkCoords, Quadrant, QUADRANT_COUNT};

/// Growable column-major boolean grid for one quadrant.
#[derive(Debug, Clone, Default)]
struct QuadrantGrid {
    columns: Vec<Vec<bool>>,
}

impl QuadrantGrid {
    fn get(&self, x: usize, y: usize) -> bool {
        self.columns
            .get(x)
            .and_then(|column| column.get(y))
            .copied()
            .unwrap_or(false)
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn row_count(&self, x: usize) -> usize {
        self.columns.get(x).map_or(0, Vec::len)
    }
}

/// Records which chunks have ever been populated.
///
/// Cells are created on first touch and only ever flip from `false` to `true`.
#[derive(Debug, Clone, Default)]
pub struct FillRegistry {
    quadrants: [QuadrantGrid; QUADRANT_COUNT],
    filled: usize,
}

impl FillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate a `size` by `size` block at the corner of a quadrant.
    pub fn reserve(&mut self, quadrant: Quadrant, size: u32) {
        if size == 0 {
            return;
        }
        let corner = ChunkCoords::new(quadrant, size - 1, size - 1);
        let grid = &mut self.quadrants[quadrant.index()];
        let size = size as usize;
        if grid.columns.len() < size {
            grid.columns.resize_with(size, Vec::new);
        }
        for column in grid.columns.iter_mut().take(size) {
            if column.len() < size {
                column.resize(size, false);
            }
        }
        debug!("Reserved {}x{} fill cells up to {}", size, size, corner);
    }

    /// Make `coords` addressable without touching existing values.
    ///
    /// Returns `true` when more than one column or row had to be added at once.
    pub fn ensure_capacity(&mut self, coords: ChunkCoords) -> bool {
        let grid = &mut self.quadrants[coords.quadrant.index()];
        let x = coords.x as usize;
        let y = coords.y as usize;

        let columns = grid.column_count();
        let column_jump = x > columns;
        if column_jump {
            warn!(
                "Fill registry grew {} columns at once in {:?} for {}",
                x + 1 - columns,
                coords.quadrant,
                coords
            );
        }
        while grid.columns.len() <= x {
            grid.columns.push(Vec::new());
        }

        let rows = grid.row_count(x);
        let row_jump = y > rows;
        if row_jump {
            warn!(
                "Fill registry grew {} rows at once in {:?} for {}",
                y + 1 - rows,
                coords.quadrant,
                coords
            );
        }
        let column = &mut grid.columns[x];
        while column.len() <= y {
            column.push(false);
        }
        column_jump || row_jump
    }

    /// Whether `coords` has been filled. Cells that were never touched are not filled.
    pub fn is_filled(&self, coords: ChunkCoords) -> bool {
        self.quadrants[coords.quadrant.index()].get(coords.x as usize, coords.y as usize)
    }

    /// Mark `coords` filled, growing first if needed. Returns `false` if it already was.
    pub fn mark_filled(&mut self, coords: ChunkCoords) -> bool {
        self.ensure_capacity(coords);
        let cell = &mut self.quadrants[coords.quadrant.index()].columns[coords.x as usize]
            [coords.y as usize];
        if *cell {
            return false;
        }
        *cell = true;
        self.filled += 1;
        true
    }

    /// Number of filled chunks across all quadrants.
    pub fn filled_count(&self) -> usize {
        self.filled
    }

    /// Number of addressable cells in a quadrant.
    pub fn capacity(&self, quadrant: Quadrant) -> usize {
        self.quadrants[quadrant.index()]
            .columns
            .iter()
            .map(Vec::len)
            .sum()
    }

    /// All filled chunks, quadrant by quadrant, column-major.
    pub fn snapshot(&self) -> FillSnapshot {
        let mut filled = Vec::with_capacity(self.filled);
        for &quadrant in Quadrant::all() {
            let grid = &self.quadrants[quadrant.index()];
            for (x, column) in grid.columns.iter().enumerate() {
                for (y, &cell) in column.iter().enumerate() {
                    if cell {
                        filled.push(ChunkCoords::new(quadrant, x as u32, y as u32));
                    }
                }
            }
        }
        FillSnapshot { filled }
    }

    /// Merge a snapshot into the registry. Returns how many chunks were newly marked.
    pub fn restore(&mut self, snapshot: &FillSnapshot) -> usize {
        snapshot
            .filled
            .iter()
            .filter(|&&coords| self.mark_filled(coords))
            .count()
    }
}

/// Serializable list of filled chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillSnapshot {
    pub filled: Vec<ChunkCoords>,
}
