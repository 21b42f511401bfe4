//! Procedural terrain streaming.
//!
//! An unbounded 2D heightmap surface, generated on demand: a seedable
//! gradient-noise synthesizer ([`GradientNoise`]) feeds a chunk streaming
//! manager ([`ChunkManager`]) that keeps a square window of populated
//! tiles resident around a moving observer, populating newly visible tiles
//! on background workers and evicting tiles that leave the view radius.
//!
//! Rasterization, windowing, and color mapping are external collaborators:
//! this crate hands out ready tiles as stable row-major point grids and
//! consumes nothing but an observer position per update.

// Noise module with the gradient-noise synthesizer
pub mod noise;

// World module with chunk streaming and population
pub mod world;

// Configuration and defaults
pub mod config;
pub mod constants;

// Re-exports
pub use config::{ConfigError, NoiseMode, NoiseParams, StreamConfig, default_worker_count};
pub use constants::*;
pub use noise::GradientNoise;
pub use world::{Chunk, ChunkCache, ChunkCoord, ChunkGenerator, ChunkManager, ViewState};
