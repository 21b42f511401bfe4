//! Streaming and noise configuration.
//!
//! All values arrive as plain scalars from the CLI-parsing collaborator and
//! are validated once when the `ChunkManager` is constructed. An invalid
//! grid is fatal at construction; there is no partially-valid manager.

use thiserror::Error;

use crate::constants::*;

/// Fatal configuration errors, surfaced at manager construction.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("chunk size must be positive, got {0}")]
    NonPositiveChunkSize(f64),

    #[error("resolution must be positive, got {0}")]
    NonPositiveResolution(f64),

    #[error("resolution {resolution} does not evenly divide chunk size {chunk_size}")]
    UnevenResolution { chunk_size: f64, resolution: f64 },

    #[error("view distance must be at least 1 chunk")]
    ZeroViewDistance,

    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("noise mode index {0} out of range (expected 0-3)")]
    InvalidMode(u8),
}

/// Fractal composition mode for 2D noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseMode {
    /// Signed octave sum scaled to `[-max, max]`.
    #[default]
    Fractal,
    /// Sum of octave magnitudes, remapped to `[-max, max]`.
    Turbulent,
    /// Sum of octave magnitudes passed through `max * cos(2*pi*h)` banding.
    Opalescent,
    /// Like `Fractal`, but the first detail octave is damped on steep slopes.
    GradientWeighted,
}

impl NoiseMode {
    pub fn index(self) -> u8 {
        match self {
            NoiseMode::Fractal => 0,
            NoiseMode::Turbulent => 1,
            NoiseMode::Opalescent => 2,
            NoiseMode::GradientWeighted => 3,
        }
    }
}

impl TryFrom<u8> for NoiseMode {
    type Error = ConfigError;

    fn try_from(index: u8) -> Result<Self, ConfigError> {
        match index {
            0 => Ok(NoiseMode::Fractal),
            1 => Ok(NoiseMode::Turbulent),
            2 => Ok(NoiseMode::Opalescent),
            3 => Ok(NoiseMode::GradientWeighted),
            other => Err(ConfigError::InvalidMode(other)),
        }
    }
}

/// Parameters for one fractal noise evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    pub mode: NoiseMode,
    /// Number of octaves to sum. Zero degrades to a zero-length sum.
    pub octaves: u32,
    pub freq_start: f64,
    /// Frequency multiplier applied per octave.
    pub freq_rate: f64,
    /// Amplitude multiplier applied per octave.
    pub amp_rate: f64,
    /// Output amplitude bound for the remapped height.
    pub max_height: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            mode: NoiseMode::default(),
            octaves: DEFAULT_OCTAVES,
            freq_start: DEFAULT_FREQ_START,
            freq_rate: DEFAULT_FREQ_RATE,
            amp_rate: DEFAULT_AMP_RATE,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

/// Full configuration for a [`crate::ChunkManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub seed: u64,
    /// Tile width in world units.
    pub chunk_size: f64,
    /// Spacing between adjacent lattice points in world units.
    pub resolution: f64,
    /// Chebyshev radius of the loaded window, in chunks.
    pub view_distance: u16,
    /// Number of population worker threads.
    pub workers: usize,
    pub noise: NoiseParams,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            chunk_size: DEFAULT_CHUNK_SIZE,
            resolution: DEFAULT_RESOLUTION,
            view_distance: DEFAULT_VIEW_DISTANCE,
            workers: default_worker_count(),
            noise: NoiseParams::default(),
        }
    }
}

impl StreamConfig {
    /// Check every construction-time invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.chunk_size > 0.0) {
            return Err(ConfigError::NonPositiveChunkSize(self.chunk_size));
        }
        if !(self.resolution > 0.0) {
            return Err(ConfigError::NonPositiveResolution(self.resolution));
        }
        let ratio = self.chunk_size / self.resolution;
        if ratio < 1.0 || (ratio - ratio.round()).abs() > GRID_EPSILON {
            return Err(ConfigError::UnevenResolution {
                chunk_size: self.chunk_size,
                resolution: self.resolution,
            });
        }
        if self.view_distance == 0 {
            return Err(ConfigError::ZeroViewDistance);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Lattice points per tile side. Only meaningful after [`Self::validate`].
    pub fn points_per_side(&self) -> usize {
        (self.chunk_size / self.resolution).round() as usize
    }
}

/// Default worker count: leave one core for the update/render threads.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StreamConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.points_per_side(), 16);
    }

    #[test]
    fn rejects_uneven_resolution() {
        let config = StreamConfig {
            chunk_size: 16.0,
            resolution: 3.0,
            ..StreamConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnevenResolution {
                chunk_size: 16.0,
                resolution: 3.0,
            })
        );
    }

    #[test]
    fn rejects_resolution_coarser_than_chunk() {
        let config = StreamConfig {
            chunk_size: 16.0,
            resolution: 32.0,
            ..StreamConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnevenResolution { .. })
        ));
    }

    #[test]
    fn rejects_zero_view_distance() {
        let config = StreamConfig {
            view_distance: 0,
            ..StreamConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroViewDistance));
    }

    #[test]
    fn rejects_non_positive_grid() {
        let config = StreamConfig {
            chunk_size: 0.0,
            ..StreamConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveChunkSize(0.0)));

        let config = StreamConfig {
            resolution: -1.0,
            ..StreamConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveResolution(-1.0)));
    }

    #[test]
    fn mode_round_trips_through_index() {
        for index in 0..=3u8 {
            let mode = NoiseMode::try_from(index).unwrap();
            assert_eq!(mode.index(), index);
        }
        assert_eq!(NoiseMode::try_from(4), Err(ConfigError::InvalidMode(4)));
    }

    #[test]
    fn fractional_resolution_divides_cleanly() {
        let config = StreamConfig {
            chunk_size: 16.0,
            resolution: 0.5,
            ..StreamConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.points_per_side(), 32);
    }
}
