//! Coordinate-indexed tile cache shared between the update thread, the
//! population workers, and read-only consumers.
//!
//! One mutex guards the whole map; every critical section is scoped to a
//! single insert, commit, erase, or read pass, never across a population.
//! The map is also the coordinate state machine: an absent key is Absent,
//! a present non-ready tile is Pending, a present ready tile is Ready.
//!
//! Workers must go through [`ChunkCache::commit`], which re-checks that the
//! coordinate is still wanted before making the write visible. A commit for
//! a coordinate that was evicted mid-flight is discarded rather than
//! resurrecting the tile, and a second commit against a Ready coordinate is
//! discarded rather than mutating it in place.

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::chunk::{Chunk, ChunkCoord};

/// What happened to a worker's finished tile at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommitOutcome {
    /// The coordinate was still pending; the tile is now visible.
    Committed,
    /// The coordinate was evicted while the tile was being built.
    Evicted,
    /// The coordinate already holds a ready tile; the write was stale.
    AlreadyReady,
}

pub struct ChunkCache {
    chunks: Mutex<FxHashMap<ChunkCoord, Chunk>>,
    drained: Condvar,
}

impl ChunkCache {
    pub(crate) fn new() -> Self {
        Self {
            chunks: Mutex::new(FxHashMap::default()),
            drained: Condvar::new(),
        }
    }

    /// Insert a pending placeholder. Returns false (and changes nothing)
    /// if the coordinate is already present in any state.
    pub(crate) fn insert_placeholder(&self, chunk: Chunk) -> bool {
        debug_assert!(!chunk.is_ready());
        let mut chunks = self.chunks.lock();
        if chunks.contains_key(&chunk.coord()) {
            return false;
        }
        chunks.insert(chunk.coord(), chunk);
        true
    }

    /// Make a populated tile visible, unless the coordinate stopped being
    /// required while the worker was running.
    pub(crate) fn commit(&self, chunk: Chunk) -> CommitOutcome {
        let coord = chunk.coord();
        let mut chunks = self.chunks.lock();
        let outcome = match chunks.get(&coord) {
            Some(existing) if existing.is_ready() => {
                warn!("discarding duplicate tile for ready chunk {coord}");
                CommitOutcome::AlreadyReady
            }
            Some(_) => {
                chunks.insert(coord, chunk);
                CommitOutcome::Committed
            }
            None => {
                debug!("discarding tile for evicted chunk {coord}");
                CommitOutcome::Evicted
            }
        };
        drop(chunks);
        self.drained.notify_all();
        outcome
    }

    /// Failure path: drop the pending placeholder so the coordinate reads
    /// Absent and a later update can retry it. Ready tiles are untouched.
    pub(crate) fn discard_pending(&self, coord: ChunkCoord) {
        let mut chunks = self.chunks.lock();
        if chunks.get(&coord).is_some_and(|c| !c.is_ready()) {
            chunks.remove(&coord);
        }
        drop(chunks);
        self.drained.notify_all();
    }

    /// Remove a coordinate in any state. Returns whether it was present.
    pub(crate) fn evict(&self, coord: ChunkCoord) -> bool {
        let removed = self.chunks.lock().remove(&coord).is_some();
        if removed {
            self.drained.notify_all();
        }
        removed
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.lock().contains_key(&coord)
    }

    /// Present and still waiting for its population task.
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.chunks.lock().get(&coord).is_some_and(|c| !c.is_ready())
    }

    pub fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.lock().is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.chunks.lock().values().filter(|c| !c.is_ready()).count()
    }

    pub fn ready_count(&self) -> usize {
        self.chunks.lock().values().filter(|c| c.is_ready()).count()
    }

    /// All present coordinates, sorted by `(x, z)`.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.lock().keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Ready coordinates, sorted by `(x, z)` for deterministic iteration.
    pub fn ready_coords(&self) -> Vec<ChunkCoord> {
        let chunks = self.chunks.lock();
        let mut coords: Vec<ChunkCoord> = chunks
            .values()
            .filter(|c| c.is_ready())
            .map(|c| c.coord())
            .collect();
        coords.sort_unstable();
        coords
    }

    /// Run `f` over every ready tile while holding the cache lock.
    ///
    /// Consumers iterating tiles must synchronize on this lock; iterating a
    /// snapshot while workers insert would race otherwise. Keep `f` short.
    pub fn for_each_ready(&self, mut f: impl FnMut(&Chunk)) {
        let chunks = self.chunks.lock();
        let mut ready: Vec<&Chunk> = chunks.values().filter(|c| c.is_ready()).collect();
        ready.sort_unstable_by_key(|c| c.coord());
        for chunk in ready {
            f(chunk);
        }
    }

    /// Borrow one tile under the lock, if present.
    pub fn with_chunk<R>(&self, coord: ChunkCoord, f: impl FnOnce(&Chunk) -> R) -> Option<R> {
        let chunks = self.chunks.lock();
        chunks.get(&coord).map(f)
    }

    /// Block until no pending coordinates remain: the eventual-consistency
    /// point where the cache equals the required window exactly.
    pub fn wait_idle(&self) {
        let mut chunks = self.chunks.lock();
        while chunks.values().any(|c| !c.is_ready()) {
            self.drained.wait(&mut chunks);
        }
    }
}
