//! Chunk streaming around a moving observer.
//!
//! The manager owns the tile cache and the population worker pool. Each
//! `update` re-centers the loaded window in whole-chunk steps when the
//! observer crosses a window boundary, queues population for every newly
//! required coordinate, and evicts everything that left the view radius.
//! Removals always run after the pass's insertions, so a coordinate is
//! never admitted and evicted in the same cycle.

use glam::DVec3;
use std::sync::Arc;
use tracing::{debug, info};

use super::cache::ChunkCache;
use super::chunk::{Chunk, ChunkCoord};
use super::generator::ChunkGenerator;
use super::loader::PopulateWorkers;
use crate::config::{ConfigError, StreamConfig};

/// Observer tracking state. The window center is distinct from the
/// observer position: it only moves in whole-chunk steps, when the
/// observer leaves the `center ± chunk_size / 2` band on an axis.
#[derive(Debug, Clone, Copy)]
pub struct ViewState {
    pub position: DVec3,
    pub previous: DVec3,
    pub center: DVec3,
}

pub struct ChunkManager {
    config: StreamConfig,
    generator: ChunkGenerator,
    cache: Arc<ChunkCache>,
    workers: PopulateWorkers,
    view: ViewState,
    center_chunk: ChunkCoord,
}

impl ChunkManager {
    /// Validate the configuration, spawn the worker pool, and load the
    /// initial window around the origin. The origin tile is populated
    /// synchronously so a consumer has geometry immediately; the rest of
    /// the window is handed to the workers.
    pub fn new(config: StreamConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let generator = ChunkGenerator::new(&config);
        let cache = Arc::new(ChunkCache::new());
        let workers = PopulateWorkers::spawn(config.workers, generator.clone(), Arc::clone(&cache));

        let manager = Self {
            generator,
            cache,
            workers,
            view: ViewState {
                position: DVec3::ZERO,
                previous: DVec3::ZERO,
                center: DVec3::ZERO,
            },
            center_chunk: ChunkCoord::ORIGIN,
            config,
        };

        manager
            .cache
            .insert_placeholder(manager.placeholder(ChunkCoord::ORIGIN));
        manager.cache.commit(manager.generator.generate(ChunkCoord::ORIGIN));
        manager.request_missing();

        info!(
            "chunk manager up: seed {}, {} workers, view distance {}",
            manager.config.seed, manager.config.workers, manager.config.view_distance
        );
        Ok(manager)
    }

    /// Feed a new observer position. Never blocks on population; only
    /// takes the cache lock for insertion and eviction bookkeeping.
    pub fn update(&mut self, observer: DVec3) {
        self.view.previous = self.view.position;
        self.view.position = observer;

        let step = self.config.chunk_size;
        let half = step / 2.0;
        let mut moved = false;

        // One whole-chunk step per crossing; the loops absorb teleports.
        while self.view.position.x > self.view.center.x + half {
            self.view.center.x += step;
            self.center_chunk.x += 1;
            moved = true;
        }
        while self.view.position.x < self.view.center.x - half {
            self.view.center.x -= step;
            self.center_chunk.x -= 1;
            moved = true;
        }
        while self.view.position.z > self.view.center.z + half {
            self.view.center.z += step;
            self.center_chunk.z += 1;
            moved = true;
        }
        while self.view.position.z < self.view.center.z - half {
            self.view.center.z -= step;
            self.center_chunk.z -= 1;
            moved = true;
        }

        if !moved {
            return;
        }
        debug!("window re-centered on chunk {}", self.center_chunk);

        self.request_missing();
        self.evict_out_of_range();
    }

    /// Queue population for every required coordinate that is Absent,
    /// nearest to the window center first.
    fn request_missing(&self) {
        let view = self.config.view_distance as i64;
        let mut missing = Vec::new();
        for dx in -view..=view {
            for dz in -view..=view {
                let coord = ChunkCoord::new(self.center_chunk.x + dx, self.center_chunk.z + dz);
                if !self.cache.contains(coord) {
                    missing.push(coord);
                }
            }
        }
        missing.sort_unstable_by_key(|coord| coord.dist_sq(self.center_chunk));

        for coord in missing {
            if self.cache.insert_placeholder(self.placeholder(coord)) {
                self.workers.dispatch(coord);
            }
        }
    }

    /// Remove every present coordinate outside the view radius. Runs after
    /// the insertion pass.
    fn evict_out_of_range(&self) {
        let view = self.config.view_distance as u64;
        for coord in self.cache.coords() {
            if coord.chebyshev(self.center_chunk) > view && self.cache.evict(coord) {
                debug!("evicted chunk {coord}");
            }
        }
    }

    fn placeholder(&self, coord: ChunkCoord) -> Chunk {
        Chunk::placeholder(coord, self.config.chunk_size, self.config.points_per_side())
    }

    /// The tile cache, for the rendering / 2D-map consumers. Reads
    /// synchronize on the cache's own lock.
    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn center_chunk(&self) -> ChunkCoord {
        self.center_chunk
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Block until every queued population has landed (or been discarded).
    pub fn wait_idle(&self) {
        self.cache.wait_idle();
    }

    /// Join all workers. Blocks until outstanding population tasks have
    /// drained; called automatically on drop.
    pub fn shutdown(&mut self) {
        self.workers.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(view_distance: u16) -> ChunkManager {
        ChunkManager::new(StreamConfig {
            seed: 123,
            chunk_size: 16.0,
            resolution: 1.0,
            view_distance,
            workers: 2,
            ..StreamConfig::default()
        })
        .unwrap()
    }

    fn window(center: ChunkCoord, view: i64) -> Vec<ChunkCoord> {
        let mut coords = Vec::new();
        for dx in -view..=view {
            for dz in -view..=view {
                coords.push(ChunkCoord::new(center.x + dx, center.z + dz));
            }
        }
        coords.sort_unstable();
        coords
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let err = ChunkManager::new(StreamConfig {
            chunk_size: 16.0,
            resolution: 5.0,
            ..StreamConfig::default()
        });
        assert!(matches!(err, Err(ConfigError::UnevenResolution { .. })));
    }

    #[test]
    fn origin_tile_is_ready_at_construction() {
        let manager = manager(1);
        let ready = manager
            .cache()
            .with_chunk(ChunkCoord::ORIGIN, |c| c.is_ready());
        assert_eq!(ready, Some(true));
    }

    #[test]
    fn initial_window_fills_in() {
        let manager = manager(1);
        manager.wait_idle();
        assert_eq!(
            manager.cache().ready_coords(),
            window(ChunkCoord::ORIGIN, 1)
        );
    }

    #[test]
    fn update_inside_the_band_changes_nothing() {
        let mut manager = manager(1);
        manager.wait_idle();
        manager.update(DVec3::new(7.9, 0.0, -7.9));
        assert_eq!(manager.center_chunk(), ChunkCoord::ORIGIN);
        assert_eq!(
            manager.cache().ready_coords(),
            window(ChunkCoord::ORIGIN, 1)
        );
    }

    #[test]
    fn crossing_shifts_one_chunk_and_evicts_the_far_column() {
        let mut manager = manager(1);
        manager.wait_idle();

        manager.update(DVec3::new(17.0, 0.0, 0.0));
        assert_eq!(manager.center_chunk(), ChunkCoord::new(1, 0));
        // the stale column is gone in the same update cycle
        for z in -1..=1 {
            assert!(!manager.cache().contains(ChunkCoord::new(-1, z)));
        }

        manager.wait_idle();
        assert_eq!(
            manager.cache().ready_coords(),
            window(ChunkCoord::new(1, 0), 1)
        );
    }

    #[test]
    fn teleport_re_centers_across_multiple_chunks() {
        let mut manager = manager(1);
        manager.update(DVec3::new(100.0, 0.0, -100.0));
        assert_eq!(manager.center_chunk(), ChunkCoord::new(6, -6));
        manager.wait_idle();
        assert_eq!(
            manager.cache().ready_coords(),
            window(ChunkCoord::new(6, -6), 1)
        );
    }

    #[test]
    fn both_axes_may_shift_in_one_update() {
        let mut manager = manager(1);
        manager.update(DVec3::new(9.0, 0.0, 9.0));
        assert_eq!(manager.center_chunk(), ChunkCoord::new(1, 1));
    }

    #[test]
    fn view_state_tracks_previous_position() {
        let mut manager = manager(1);
        manager.update(DVec3::new(3.0, 0.0, 0.0));
        manager.update(DVec3::new(5.0, 0.0, 1.0));
        assert_eq!(manager.view().previous, DVec3::new(3.0, 0.0, 0.0));
        assert_eq!(manager.view().position, DVec3::new(5.0, 0.0, 1.0));
        assert_eq!(manager.view().center, DVec3::ZERO);
    }

    #[test]
    fn repopulation_after_eviction_is_bit_identical() {
        let mut manager = manager(1);
        manager.wait_idle();
        let coord = ChunkCoord::new(-1, 0);
        let before: Vec<u64> = manager
            .cache()
            .with_chunk(coord, |c| c.points().iter().map(|p| p.y.to_bits()).collect())
            .unwrap();

        // walk away far enough to evict, then come back
        manager.update(DVec3::new(64.0, 0.0, 0.0));
        assert!(!manager.cache().contains(coord));
        manager.update(DVec3::ZERO);
        manager.wait_idle();

        let after: Vec<u64> = manager
            .cache()
            .with_chunk(coord, |c| c.points().iter().map(|p| p.y.to_bits()).collect())
            .unwrap();
        assert_eq!(before, after);
    }
}
