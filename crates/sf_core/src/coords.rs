use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Default side length of a chunk in world units.
pub const DEFAULT_CHUNK_SIZE: f32 = 10.0;

/// Number of quadrants the plane is split into.
pub const QUADRANT_COUNT: usize = 4;

/// One of the four sign-combinations of the plane.
///
/// Splitting the plane this way keeps every local chunk index non-negative,
/// so each quadrant can be stored as a plain growable 2D array.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub enum Quadrant {
    /// `x >= 0`, `y >= 0`
    UpRight = 0,
    /// `x >= 0`, `y < 0`
    DownRight = 1,
    /// `x < 0`, `y < 0`
    DownLeft = 2,
    /// `x < 0`, `y >= 0`
    UpLeft = 3,
}

impl Quadrant {
    /// Returns all quadrants in index order.
    pub fn all() -> &'static [Quadrant] {
        &[
            Self::UpRight,
            Self::DownRight,
            Self::DownLeft,
            Self::UpLeft,
        ]
    }

    /// Index for array access (0-3).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a quadrant by index. Anything outside `0..4` is rejected.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    const fn of(sx: i64, sy: i64) -> Self {
        match (sx >= 0, sy >= 0) {
            (true, true) => Self::UpRight,
            (true, false) => Self::DownRight,
            (false, false) => Self::DownLeft,
            (false, true) => Self::UpLeft,
        }
    }
}

/// Address of a chunk: a quadrant plus non-negative local offsets within it.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ChunkCoords {
    pub quadrant: Quadrant,
    pub x: u32,
    pub y: u32,
}

impl ChunkCoords {
    /// The chunk whose lower-left corner sits on the world origin.
    pub const ORIGIN: Self = Self::new(Quadrant::UpRight, 0, 0);

    pub const fn new(quadrant: Quadrant, x: u32, y: u32) -> Self {
        Self { quadrant, x, y }
    }

    /// Builds coordinates from a raw quadrant index, rejecting indices outside `0..4`.
    pub fn from_index(quadrant: usize, x: u32, y: u32) -> Option<Self> {
        Quadrant::from_index(quadrant).map(|quadrant| Self::new(quadrant, x, y))
    }

    /// Normalizes a signed chunk index into quadrant form.
    ///
    /// Negative axes are folded with `-v - 1` so that chunk `-1` maps to local
    /// index `0` of the negative quadrant. Returns `None` when the folded index
    /// does not fit the local range.
    pub fn from_signed(sx: i64, sy: i64) -> Option<Self> {
        let quadrant = Quadrant::of(sx, sy);
        let x = u32::try_from(fold(sx)).ok()?;
        let y = u32::try_from(fold(sy)).ok()?;
        Some(Self::new(quadrant, x, y))
    }

    /// Signed chunk index of these coordinates.
    pub const fn to_signed(self) -> (i64, i64) {
        let x = self.x as i64;
        let y = self.y as i64;
        match self.quadrant {
            Quadrant::UpRight => (x, y),
            Quadrant::DownRight => (x, !y),
            Quadrant::DownLeft => (!x, !y),
            Quadrant::UpLeft => (!x, y),
        }
    }

    /// Chunk containing a world-space position.
    pub fn from_world(position: Vec2, chunk_size: f32) -> Option<Self> {
        if !position.is_finite() || chunk_size.is_nan() || chunk_size <= 0.0 {
            return None;
        }
        // Float-to-int casts saturate, and saturated values are rejected by `from_signed`.
        let sx = (position.x / chunk_size).floor() as i64;
        let sy = (position.y / chunk_size).floor() as i64;
        Self::from_signed(sx, sy)
    }

    /// Coordinates shifted by a signed chunk offset, if representable.
    pub fn offset(self, dx: i64, dy: i64) -> Option<Self> {
        let (sx, sy) = self.to_signed();
        Self::from_signed(sx.checked_add(dx)?, sy.checked_add(dy)?)
    }

    /// World-space centre point of the chunk.
    pub fn center(self, chunk_size: f32) -> Vec2 {
        let (sx, sy) = self.to_signed();
        Vec2::new(
            (sx as f32 + 0.5) * chunk_size,
            (sy as f32 + 0.5) * chunk_size,
        )
    }

    /// World-space rectangle covered by the chunk.
    pub fn bounds(self, chunk_size: f32) -> ChunkBounds {
        let (sx, sy) = self.to_signed();
        let min = Vec2::new(sx as f32 * chunk_size, sy as f32 * chunk_size);
        ChunkBounds {
            min,
            max: min + Vec2::splat(chunk_size),
        }
    }

    /// Distance from the world origin to the chunk centre.
    pub fn distance_from_origin(self, chunk_size: f32) -> f32 {
        self.center(chunk_size).length()
    }

    /// Largest local index, used for extent checks.
    pub const fn max_local_index(self) -> u32 {
        if self.x > self.y {
            self.x
        } else {
            self.y
        }
    }
}

impl Default for ChunkCoords {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl std::fmt::Display for ChunkCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (sx, sy) = self.to_signed();
        write!(f, "({}, {})", sx, sy)
    }
}

/// Axis-aligned world-space rectangle of a chunk. `max` is exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl ChunkBounds {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.y >= self.min.y && point.x < self.max.x && point.y < self.max.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Appends every chunk lying exactly on the square ring of `radius` around `center`.
///
/// Columns are visited with x ascending; inside a column y ascends. Interior
/// columns only contribute their top and bottom cells. Chunks that cannot be
/// represented are skipped.
pub fn ring_border(center: ChunkCoords, radius: u32, out: &mut Vec<ChunkCoords>) {
    let r = i64::from(radius);
    for dx in -r..=r {
        if dx == -r || dx == r {
            for dy in -r..=r {
                out.extend(center.offset(dx, dy));
            }
        } else {
            out.extend(center.offset(dx, -r));
            out.extend(center.offset(dx, r));
        }
    }
}

const fn fold(v: i64) -> i64 {
    if v >= 0 {
        v
    } else {
        !v
    }
}
