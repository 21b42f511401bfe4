//! Chunk coordinate and tile types.

use glam::{DVec2, DVec3};
use std::fmt;

/// Position of a tile on the infinite chunk grid (chunk units, not world
/// units). Ordered by `(x, z)` so iteration order is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i64,
    pub z: i64,
}

impl ChunkCoord {
    pub const ORIGIN: ChunkCoord = ChunkCoord { x: 0, z: 0 };

    pub fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// Chebyshev distance: `max(|dx|, |dz|)`. Defines the square view window.
    pub fn chebyshev(self, other: ChunkCoord) -> u64 {
        let dx = self.x.abs_diff(other.x);
        let dz = self.z.abs_diff(other.z);
        dx.max(dz)
    }

    /// Squared Euclidean distance in chunk units, used for load priority.
    pub fn dist_sq(self, other: ChunkCoord) -> i64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    /// World-space origin of this tile: `coordinate * chunk_size`.
    pub fn world_offset(self, chunk_size: f64) -> DVec2 {
        DVec2::new(self.x as f64 * chunk_size, self.z as f64 * chunk_size)
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// One materialized terrain tile: a fixed-size row-major grid of
/// world-space points plus a ready flag.
///
/// A tile is created empty (`ready == false`) when its coordinate becomes
/// required, replaced wholesale by the worker that populates it, and never
/// mutated again after turning ready. Derived rendering resources (index
/// buffers, colors) belong to the renderer collaborator, not to this type.
pub struct Chunk {
    coord: ChunkCoord,
    chunk_size: f64,
    points_per_side: usize,
    points: Vec<DVec3>,
    ready: bool,
}

impl Chunk {
    /// Empty pending tile, inserted synchronously when the coordinate
    /// first becomes required.
    pub(crate) fn placeholder(coord: ChunkCoord, chunk_size: f64, points_per_side: usize) -> Self {
        Self {
            coord,
            chunk_size,
            points_per_side,
            points: Vec::new(),
            ready: false,
        }
    }

    /// Fully populated tile, built off-thread by a worker.
    pub(crate) fn populated(
        coord: ChunkCoord,
        chunk_size: f64,
        points_per_side: usize,
        points: Vec<DVec3>,
    ) -> Self {
        debug_assert_eq!(points.len(), points_per_side * points_per_side);
        Self {
            coord,
            chunk_size,
            points_per_side,
            points,
            ready: true,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }

    pub fn points_per_side(&self) -> usize {
        self.points_per_side
    }

    /// Heights computed and committed; the point grid is final.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Row-major `(x, height, z)` points. Row index advances world x,
    /// column index advances world z; ordering is stable across tiles of
    /// equal resolution so one index-buffer layout fits every tile.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn point(&self, row: usize, col: usize) -> DVec3 {
        self.points[row * self.points_per_side + col]
    }
}
