//! One Euro Filter - adaptive low-pass filter for keypoint jitter
//!
//! Smooth when a joint is still (reduces jitter), responsive when it moves
//! fast. One instance per scalar channel; three per joint.

use std::f32::consts::PI;

use nalgebra::Vector3;

/// Tuning shared by every channel filter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterParams {
    /// Nominal sample rate (Hz), used when the host supplies no timestamps
    pub frequency: f32,
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    pub min_cutoff: f32,
    /// Speed coefficient - higher = less lag during fast motion
    pub beta: f32,
    /// Derivative cutoff frequency (Hz)
    pub deriv_cutoff: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            frequency: 30.0,
            min_cutoff: 1.0,
            beta: 0.1,
            deriv_cutoff: 1.0,
        }
    }
}

/// Adaptive low-pass filter: smooth at rest, responsive during motion
#[derive(Clone, Debug)]
pub struct OneEuroFilter {
    params: FilterParams,

    // State
    x_prev: f32,
    dx_prev: f32,
    t_prev: f64,
    initialized: bool,
}

impl OneEuroFilter {
    pub fn new(params: FilterParams) -> Self {
        Self {
            params,
            x_prev: 0.0,
            dx_prev: 0.0,
            t_prev: 0.0,
            initialized: false,
        }
    }

    /// Smoothing factor for a cutoff (Hz) over an elapsed time (s)
    ///
    /// `1 / (1 + tau / t_e)` with `tau = 1 / (2π·cutoff)`
    fn smoothing_factor(t_e: f32, cutoff: f32) -> f32 {
        let r = 2.0 * PI * cutoff * t_e;
        r / (r + 1.0)
    }

    /// Filter a single value
    ///
    /// - `x`: raw input value
    /// - `t`: timestamp in seconds
    /// Returns: filtered value. A timestamp that does not advance is a
    /// duplicate sample and yields the previous output.
    pub fn filter(&mut self, x: f32, t: f64) -> f32 {
        if !self.initialized {
            self.x_prev = x;
            self.dx_prev = 0.0;
            self.t_prev = t;
            self.initialized = true;
            return x;
        }

        let t_e = (t - self.t_prev) as f32;
        if !t_e.is_finite() || t_e <= 0.0 {
            return self.x_prev;
        }

        // 1. Estimate derivative (velocity)
        let a_d = Self::smoothing_factor(t_e, self.params.deriv_cutoff);
        let dx = (x - self.x_prev) / t_e;
        let dx_hat = a_d * dx + (1.0 - a_d) * self.dx_prev;

        // 2. Adaptive cutoff: more smoothing when slow, less when fast
        let cutoff = self.params.min_cutoff + self.params.beta * dx_hat.abs();
        let a = Self::smoothing_factor(t_e, cutoff);

        // 3. Apply filter
        let x_hat = a * x + (1.0 - a) * self.x_prev;

        self.x_prev = x_hat;
        self.dx_prev = dx_hat;
        self.t_prev = t;

        x_hat
    }

    /// Retune without dropping state
    pub fn set_params(&mut self, params: FilterParams) {
        self.params = params;
    }

    pub fn params(&self) -> FilterParams {
        self.params
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Reset filter state; the next sample initializes it directly
    pub fn reset(&mut self) {
        self.x_prev = 0.0;
        self.dx_prev = 0.0;
        self.t_prev = 0.0;
        self.initialized = false;
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::new(FilterParams::default())
    }
}

/// Three One Euro Filters for a 3D joint position
#[derive(Clone, Debug, Default)]
pub struct OneEuroFilter3D {
    pub x: OneEuroFilter,
    pub y: OneEuroFilter,
    pub z: OneEuroFilter,
}

impl OneEuroFilter3D {
    pub fn new(params: FilterParams) -> Self {
        Self {
            x: OneEuroFilter::new(params),
            y: OneEuroFilter::new(params),
            z: OneEuroFilter::new(params),
        }
    }

    pub fn filter(&mut self, pos: Vector3<f32>, t: f64) -> Vector3<f32> {
        Vector3::new(
            self.x.filter(pos.x, t),
            self.y.filter(pos.y, t),
            self.z.filter(pos.z, t),
        )
    }

    pub fn set_params(&mut self, params: FilterParams) {
        self.x.set_params(params);
        self.y.set_params(params);
        self.z.set_params(params);
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}
