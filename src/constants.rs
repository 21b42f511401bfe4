// Streaming constants
pub const DEFAULT_SEED: u64 = 123;
pub const DEFAULT_CHUNK_SIZE: f64 = 16.0;
pub const DEFAULT_RESOLUTION: f64 = 1.0;
pub const DEFAULT_VIEW_DISTANCE: u16 = 3;

// Noise constants
pub const DEFAULT_NOISE_MODE: u8 = 0;
pub const DEFAULT_OCTAVES: u32 = 8;
pub const DEFAULT_FREQ_START: f64 = 0.05;
pub const DEFAULT_FREQ_RATE: f64 = 2.0;
pub const DEFAULT_AMP_RATE: f64 = 0.5;
pub const DEFAULT_MAX_HEIGHT: f64 = 5.0;

// Tolerance for the chunk-size / resolution divisibility check
pub const GRID_EPSILON: f64 = 1e-9;
