//! Seedable gradient noise.
//!
//! Classic Perlin-style noise over an integer lattice: each lattice point
//! carries a pseudo-random unit gradient, a query point blends the dot
//! products of the surrounding cell's corner gradients with the quintic
//! smoothstep `6t^5 - 15t^4 + 10t^3`. The smoothstep (not linear
//! interpolation) has zero first derivative at lattice points, which is
//! what keeps adjacent tiles seamless.
//!
//! Two generators built with the same seed produce identical output for
//! identical inputs, forever. None of these operations fail; a zero octave
//! count degrades to a zero-length sum.

mod gradient;

use glam::{DVec2, DVec3};

use crate::config::{NoiseMode, NoiseParams};
use gradient::{GradientCache1, GradientCache2};

/// Quintic smoothstep: `f(t) = 6t^5 - 15t^4 + 10t^3`.
fn fade(t: f64) -> f64 {
    ((6.0 * t - 15.0) * t + 10.0) * t * t * t
}

/// Derivative of [`fade`]: `30t^4 - 60t^3 + 30t^2`.
fn fade_deriv(t: f64) -> f64 {
    ((30.0 * t - 60.0) * t + 30.0) * t * t
}

/// Deterministic, seedable gradient-noise synthesizer.
///
/// Gradient caches are shared by all threads querying this instance and
/// synchronize internally, so an `Arc<GradientNoise>` can be handed to any
/// number of workers.
pub struct GradientNoise {
    seed: u64,
    gradient1: GradientCache1,
    gradient2: GradientCache2,
}

impl GradientNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            gradient1: GradientCache1::new(seed),
            gradient2: GradientCache2::new(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 1D gradient noise. Exactly zero at integer lattice points.
    pub fn perlin1d(&self, x: f64) -> f64 {
        let x0 = x.floor();
        let u = x - x0;
        let xi = x0 as i64;

        let n0 = self.gradient1.at(xi) * u;
        let n1 = self.gradient1.at(xi + 1) * (u - 1.0);
        n0 + fade(u) * (n1 - n0)
    }

    /// 2D gradient noise. Exactly zero at integer lattice points.
    pub fn perlin2d(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let u = x - x0;
        let v = y - y0;
        let xi = x0 as i64;
        let yi = y0 as i64;

        let n00 = self.gradient2.at(xi, yi).dot(DVec2::new(u, v));
        let n10 = self.gradient2.at(xi + 1, yi).dot(DVec2::new(u - 1.0, v));
        let n01 = self.gradient2.at(xi, yi + 1).dot(DVec2::new(u, v - 1.0));
        let n11 = self.gradient2.at(xi + 1, yi + 1).dot(DVec2::new(u - 1.0, v - 1.0));

        let fu = fade(u);
        let fv = fade(v);
        let nx0 = n00 + fu * (n10 - n00);
        let nx1 = n01 + fu * (n11 - n01);
        nx0 + fv * (nx1 - nx0)
    }

    /// 2D gradient noise plus the analytic partial derivatives of the
    /// blended surface with respect to `x` and `y` (lattice space).
    pub fn perlin2d_with_gradient(&self, x: f64, y: f64) -> (f64, DVec2) {
        let x0 = x.floor();
        let y0 = y.floor();
        let u = x - x0;
        let v = y - y0;
        let xi = x0 as i64;
        let yi = y0 as i64;

        let g00 = self.gradient2.at(xi, yi);
        let g10 = self.gradient2.at(xi + 1, yi);
        let g01 = self.gradient2.at(xi, yi + 1);
        let g11 = self.gradient2.at(xi + 1, yi + 1);

        let n00 = g00.dot(DVec2::new(u, v));
        let n10 = g10.dot(DVec2::new(u - 1.0, v));
        let n01 = g01.dot(DVec2::new(u, v - 1.0));
        let n11 = g11.dot(DVec2::new(u - 1.0, v - 1.0));

        let fu = fade(u);
        let fv = fade(v);
        let dfu = fade_deriv(u);
        let dfv = fade_deriv(v);

        let nx0 = n00 + fu * (n10 - n00);
        let nx1 = n01 + fu * (n11 - n01);
        let value = nx0 + fv * (nx1 - nx0);

        let dnx0_dx = g00.x + dfu * (n10 - n00) + fu * (g10.x - g00.x);
        let dnx1_dx = g01.x + dfu * (n11 - n01) + fu * (g11.x - g01.x);
        let dn_dx = dnx0_dx + fv * (dnx1_dx - dnx0_dx);

        let dnx0_dy = g00.y + fu * (g10.y - g00.y);
        let dnx1_dy = g01.y + fu * (g11.y - g01.y);
        let dn_dy = dnx0_dy + fv * (dnx1_dy - dnx0_dy) + dfv * (nx1 - nx0);

        (value, DVec2::new(dn_dx, dn_dy))
    }

    /// Fractal 1D noise: `octaves` layers at geometrically increasing
    /// frequency and geometrically decaying amplitude.
    pub fn fractal_perlin1d(
        &self,
        x: f64,
        octaves: u32,
        freq_start: f64,
        freq_rate: f64,
        amp_rate: f64,
    ) -> f64 {
        let mut y = 0.0;
        let mut freq = freq_start;
        let mut amplitude = 1.0;
        for _ in 0..octaves {
            y += amplitude * self.perlin1d(x * freq);
            amplitude *= amp_rate;
            freq *= freq_rate;
        }
        y
    }

    /// Fractal 2D noise, remapped into `[-max, max]` according to the mode.
    ///
    /// Turbulent and opalescent modes halve the starting frequency before
    /// summing. Gradient-weighted mode damps octave 1's amplitude by
    /// `1 / (1 + |slope|)`, the slope being the analytic gradient of
    /// octave 0 at the query point, so steep areas accumulate less
    /// high-frequency detail.
    pub fn fractal_perlin2d(&self, x: f64, y: f64, params: &NoiseParams) -> f64 {
        let max = params.max_height;
        let mut height = 0.0;
        let mut freq = params.freq_start;
        let mut amplitude = 1.0;
        if matches!(params.mode, NoiseMode::Turbulent | NoiseMode::Opalescent) {
            freq /= 2.0;
        }

        let mut base_slope = 0.0;
        for k in 0..params.octaves {
            match params.mode {
                NoiseMode::Turbulent | NoiseMode::Opalescent => {
                    height += amplitude * self.perlin2d(x * freq, y * freq).abs();
                }
                NoiseMode::Fractal => {
                    height += amplitude * self.perlin2d(x * freq, y * freq);
                }
                NoiseMode::GradientWeighted => {
                    if k == 0 {
                        let (value, slope) = self.perlin2d_with_gradient(x * freq, y * freq);
                        base_slope = slope.length();
                        height += amplitude * value;
                    } else {
                        let weight = if k == 1 { 1.0 / (1.0 + base_slope) } else { 1.0 };
                        height += amplitude * weight * self.perlin2d(x * freq, y * freq);
                    }
                }
            }
            amplitude *= params.amp_rate;
            freq *= params.freq_rate;
        }

        match params.mode {
            NoiseMode::Turbulent => height * 2.0 * max - max,
            NoiseMode::Opalescent => max * (std::f64::consts::TAU * height).cos(),
            NoiseMode::Fractal | NoiseMode::GradientWeighted => height * max,
        }
    }

    /// In-place fractal overload: reads `pos.x`/`pos.z`, writes the height
    /// into `pos.y`. This is the chunk population hot path; it performs no
    /// heap allocation.
    pub fn fractal_perlin2d_in_place(&self, pos: &mut DVec3, params: &NoiseParams) {
        pos.y = self.fractal_perlin2d(pos.x, pos.z, params);
    }
}
