//! Fusion configuration section.

use serde::{Deserialize, Serialize};

use crate::grid::FusionConfig;

use super::defaults;
use super::error::ConfigLoadError;

/// Fusion configuration section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FusionSection {
    /// Truncation band past the surface (meters)
    #[serde(default = "defaults::truncation")]
    pub truncation: f32,

    /// Variance floor for seeded cells
    #[serde(default = "defaults::min_variance")]
    pub min_variance: f32,

    /// Variance assigned to each range measurement
    #[serde(default = "defaults::measurement_variance")]
    pub measurement_variance: f32,
}

impl Default for FusionSection {
    fn default() -> Self {
        Self {
            truncation: defaults::truncation(),
            min_variance: defaults::min_variance(),
            measurement_variance: defaults::measurement_variance(),
        }
    }
}

impl FusionSection {
    /// Check values that deserialize fine but break the fusion rule.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if !(self.truncation > 0.0) {
            return Err(ConfigLoadError::Invalid(format!(
                "truncation must be positive (got {})",
                self.truncation
            )));
        }
        if !(self.min_variance >= 0.0) {
            return Err(ConfigLoadError::Invalid(format!(
                "min_variance must not be negative (got {})",
                self.min_variance
            )));
        }
        if !(self.measurement_variance > 0.0) {
            return Err(ConfigLoadError::Invalid(format!(
                "measurement_variance must be positive (got {})",
                self.measurement_variance
            )));
        }
        Ok(())
    }

    /// Convert to FusionConfig
    pub fn to_fusion_config(&self) -> FusionConfig {
        FusionConfig {
            truncation: self.truncation,
            min_variance: self.min_variance,
        }
    }
}
