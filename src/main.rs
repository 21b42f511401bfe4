//! Terrain streaming demo.
//!
//! Stands in for the external collaborators: parses the configuration from
//! the command line, walks an observer across the surface, then draws an
//! ASCII 2D map of the ready tiles (each tile positioned at
//! `coordinate * chunk_size`). `--one-dim` plots a 1D fractal profile
//! instead of streaming chunks.

use clap::Parser;
use glam::DVec3;
use rustc_hash::FxHashMap;

use terraflow::{
    ChunkManager, GradientNoise, NoiseMode, NoiseParams, StreamConfig, constants::*,
    default_worker_count,
};

/// Infinite procedural terrain streamer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Noise seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Tile width in world units
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: f64,

    /// Spacing between adjacent lattice points
    #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
    resolution: f64,

    /// View radius in chunks
    #[arg(long, default_value_t = DEFAULT_VIEW_DISTANCE)]
    view_distance: u16,

    /// Population worker threads (default: core count minus one)
    #[arg(long)]
    workers: Option<usize>,

    /// Noise mode: 0 fractal, 1 turbulent, 2 opalescent, 3 gradient-weighted
    #[arg(long, default_value_t = DEFAULT_NOISE_MODE)]
    mode: u8,

    /// Number of octaves for fractal noise
    #[arg(long, default_value_t = DEFAULT_OCTAVES)]
    octaves: u32,

    /// Starting frequency for fractal noise
    #[arg(long, default_value_t = DEFAULT_FREQ_START)]
    freq_start: f64,

    /// Frequency rate for fractal noise
    #[arg(long, default_value_t = DEFAULT_FREQ_RATE)]
    freq_rate: f64,

    /// Amplitude decay rate for fractal noise
    #[arg(long, default_value_t = DEFAULT_AMP_RATE)]
    amp_rate: f64,

    /// Output height amplitude
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT)]
    max_height: f64,

    /// Observer steps to walk along +x
    #[arg(long, default_value_t = 48)]
    steps: usize,

    /// Plot noise in one dimension instead of streaming chunks
    #[arg(long, default_value_t = false)]
    one_dim: bool,

    /// Number of samples for the 1D profile
    #[arg(long, default_value_t = 100)]
    size: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), terraflow::ConfigError> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mode = NoiseMode::try_from(args.mode)?;

    let noise_params = NoiseParams {
        mode,
        octaves: args.octaves,
        freq_start: args.freq_start,
        freq_rate: args.freq_rate,
        amp_rate: args.amp_rate,
        max_height: args.max_height,
    };

    if args.one_dim {
        plot_profile(seed, args.size, &noise_params);
        return Ok(());
    }

    let config = StreamConfig {
        seed,
        chunk_size: args.chunk_size,
        resolution: args.resolution,
        view_distance: args.view_distance,
        workers: args.workers.unwrap_or_else(default_worker_count),
        noise: noise_params,
    };
    let mut manager = ChunkManager::new(config)?;

    // Walk the observer along +x, a quarter chunk per step.
    let stride = args.chunk_size / 4.0;
    let mut observer = DVec3::ZERO;
    for _ in 0..args.steps {
        observer.x += stride;
        manager.update(observer);
    }
    manager.wait_idle();

    tracing::info!(
        "walked to {:.1}, {} tiles resident around chunk {}",
        observer.x,
        manager.cache().len(),
        manager.center_chunk()
    );
    print_map(&manager);
    Ok(())
}

/// ASCII stand-in for the 2D-map view: one shade character per ready tile,
/// darker is higher mean terrain.
fn print_map(manager: &ChunkManager) {
    const SHADES: &[u8] = b" .:-=+*#%@";

    let mut means: FxHashMap<(i64, i64), f64> = FxHashMap::default();
    manager.cache().for_each_ready(|chunk| {
        let sum: f64 = chunk.points().iter().map(|p| p.y).sum();
        let mean = sum / chunk.points().len() as f64;
        means.insert((chunk.coord().x, chunk.coord().z), mean);
    });
    if means.is_empty() {
        return;
    }

    let min_x = means.keys().map(|c| c.0).min().unwrap();
    let max_x = means.keys().map(|c| c.0).max().unwrap();
    let min_z = means.keys().map(|c| c.1).min().unwrap();
    let max_z = means.keys().map(|c| c.1).max().unwrap();
    let amp = manager.config().noise.max_height;

    println!(
        "loaded window, chunks ({min_x}..{max_x}) x ({min_z}..{max_z}), seed {}:",
        manager.config().seed
    );
    for z in min_z..=max_z {
        let mut row = String::new();
        for x in min_x..=max_x {
            let shade = match means.get(&(x, z)) {
                Some(mean) => {
                    let t = ((mean + amp) / (2.0 * amp)).clamp(0.0, 1.0);
                    SHADES[(t * (SHADES.len() - 1) as f64).round() as usize]
                }
                None => b'?',
            };
            row.push(shade as char);
        }
        println!("{row}");
    }
}

/// ASCII plot of a 1D fractal profile.
fn plot_profile(seed: u64, size: usize, params: &NoiseParams) {
    const ROWS: usize = 21;

    let noise = GradientNoise::new(seed);
    let samples: Vec<f64> = (0..size)
        .map(|i| {
            noise.fractal_perlin1d(
                i as f64,
                params.octaves,
                params.freq_start,
                params.freq_rate,
                params.amp_rate,
            )
        })
        .collect();

    let lo = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = (hi - lo).max(1e-9);

    println!("1d fractal profile, seed {seed}, {size} samples in [{lo:.3}, {hi:.3}]:");
    for row in 0..ROWS {
        let level = 1.0 - row as f64 / (ROWS - 1) as f64;
        let line: String = samples
            .iter()
            .map(|&y| {
                let t = (y - lo) / span;
                if (t - level).abs() <= 0.5 / (ROWS - 1) as f64 {
                    '*'
                } else {
                    ' '
                }
            })
            .collect();
        println!("{line}");
    }
}
