//! Per-voxel signed distance state and its fusion rule.

use serde::{Deserialize, Serialize};

/// Truncation applied by the plain [`TsdfCell::fuse`] form (meters).
pub const DEFAULT_CELL_TRUNCATION: f32 = 1.0;

/// Variance floor applied by the plain [`TsdfCell::fuse`] form.
pub const DEFAULT_CELL_MIN_VARIANCE: f32 = 0.001;

/// Fused signed distance estimate of a single voxel.
///
/// The estimate is a 1-D Gaussian: `distance` is the mean signed distance
/// to the nearest surface (positive in front of it, negative behind it)
/// and `variance` its uncertainty. A cell that has never been observed
/// carries infinite variance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TsdfCell {
    /// Mean signed distance (meters)
    pub distance: f32,
    /// Variance of the distance estimate
    pub variance: f32,
}

impl Default for TsdfCell {
    fn default() -> Self {
        Self {
            distance: 0.0,
            variance: f32::INFINITY,
        }
    }
}

impl TsdfCell {
    /// True once the cell has received at least one observation.
    #[inline]
    pub fn is_observed(&self) -> bool {
        self.variance.is_finite()
    }

    /// Fuse an observation using the cell's default truncation and variance floor.
    #[inline]
    pub fn fuse(&mut self, signed_distance: f32, variance: f32) {
        self.fuse_seed(
            signed_distance,
            variance,
            DEFAULT_CELL_TRUNCATION,
            DEFAULT_CELL_MIN_VARIANCE,
        );
    }

    /// Fuse an observation with an explicit truncation band and variance floor.
    ///
    /// The observed distance is clamped to `[-truncation, truncation]`. An
    /// unobserved cell takes the observation as is; otherwise the two
    /// Gaussians are combined with inverse-variance weighting:
    ///
    /// ```text
    /// d' = (d * v_obs + d_obs * v) / (v + v_obs)
    /// v' = max(v * v_obs / (v + v_obs), min_variance)
    /// ```
    pub fn fuse_seed(
        &mut self,
        signed_distance: f32,
        variance: f32,
        truncation: f32,
        min_variance: f32,
    ) {
        // max/min instead of clamp: never panics on inverted bounds
        let observed = signed_distance.max(-truncation).min(truncation);

        if !self.is_observed() {
            self.distance = observed;
            self.variance = variance.max(min_variance);
            return;
        }

        let sum = self.variance + variance;
        self.distance = (self.distance * variance + observed * self.variance) / sum;
        self.variance = (self.variance * variance / sum).max(min_variance);
    }
}
