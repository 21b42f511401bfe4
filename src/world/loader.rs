//! Background population worker pool.
//!
//! A fixed pool of OS threads pulls coordinates off a crossbeam channel,
//! builds each tile with the shared [`ChunkGenerator`], and commits the
//! finished tile through the cache's check-required-before-insert gate.
//! Workers never block each other outside the cache's short critical
//! sections. Shutdown closes the queue and joins every worker, so no write
//! can land after the pool is gone.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};
use tracing::{debug, error, warn};

use super::cache::ChunkCache;
use super::chunk::ChunkCoord;
use super::generator::ChunkGenerator;

struct PopulateRequest {
    coord: ChunkCoord,
}

pub(crate) struct PopulateWorkers {
    request_tx: Option<Sender<PopulateRequest>>,
    handles: Vec<JoinHandle<()>>,
}

impl PopulateWorkers {
    /// Spawn `workers` threads sharing one generator (and therefore one
    /// set of gradient caches) and one cache.
    pub fn spawn(workers: usize, generator: ChunkGenerator, cache: Arc<ChunkCache>) -> Self {
        let (request_tx, request_rx) = unbounded::<PopulateRequest>();

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let rx = request_rx.clone();
            let generator = generator.clone();
            let cache = Arc::clone(&cache);

            let handle = thread::Builder::new()
                .name(format!("chunk-gen-{worker_id}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        let coord = request.coord;
                        // Evicted (or already populated) since dispatch.
                        if !cache.is_pending(coord) {
                            debug!("skipping stale population request for {coord}");
                            continue;
                        }

                        match panic::catch_unwind(AssertUnwindSafe(|| generator.generate(coord))) {
                            Ok(chunk) => {
                                // The commit re-checks that the coordinate
                                // is still required; a tile evicted while we
                                // were generating is discarded here.
                                cache.commit(chunk);
                            }
                            Err(_) => {
                                error!(
                                    "population of chunk {coord} panicked; \
                                     reverting to absent for retry"
                                );
                                cache.discard_pending(coord);
                            }
                        }
                    }
                })
                .expect("failed to spawn population worker");
            handles.push(handle);
        }

        Self {
            request_tx: Some(request_tx),
            handles,
        }
    }

    /// Queue one population task. The caller has already inserted the
    /// pending placeholder for the coordinate.
    pub fn dispatch(&self, coord: ChunkCoord) {
        match &self.request_tx {
            Some(tx) => {
                let _ = tx.send(PopulateRequest { coord });
            }
            None => warn!("dropping population request for {coord}: pool is shut down"),
        }
    }

    /// Close the request queue and join every worker. Queued requests are
    /// drained before the workers exit, so tear-down blocks until all
    /// outstanding population work has finished.
    pub fn shutdown(&mut self) {
        self.request_tx.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("population worker panicked during shutdown");
            }
        }
    }
}

impl Drop for PopulateWorkers {
    fn drop(&mut self) {
        self.shutdown();
    }
}
