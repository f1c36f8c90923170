//! Grid configuration section.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::grid::GridConfig;

use super::defaults;
use super::error::ConfigLoadError;

/// Grid configuration section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSection {
    /// Horizontal cell size (meters)
    #[serde(default = "defaults::resolution")]
    pub resolution: f64,

    /// Vertical cell size (meters). Defaults to `resolution`.
    #[serde(default)]
    pub vertical_resolution: Option<f64>,

    /// Number of columns along X
    #[serde(default = "defaults::grid_size")]
    pub num_cells_x: u32,

    /// Number of columns along Y
    #[serde(default = "defaults::grid_size")]
    pub num_cells_y: u32,

    /// Origin mode: "center" or "corner"
    #[serde(default = "defaults::origin_mode")]
    pub origin_mode: String,

    /// Origin X (for corner mode)
    #[serde(default)]
    pub origin_x: f64,

    /// Origin Y (for corner mode)
    #[serde(default)]
    pub origin_y: f64,

    /// Origin Z (for corner mode)
    #[serde(default)]
    pub origin_z: f64,

    /// Lowest height columns store (meters)
    #[serde(default = "defaults::min_height")]
    pub min_height: f64,

    /// Highest height columns store (meters)
    #[serde(default = "defaults::max_height")]
    pub max_height: f64,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            resolution: defaults::resolution(),
            vertical_resolution: None,
            num_cells_x: defaults::grid_size(),
            num_cells_y: defaults::grid_size(),
            origin_mode: defaults::origin_mode(),
            origin_x: 0.0,
            origin_y: 0.0,
            origin_z: 0.0,
            min_height: defaults::min_height(),
            max_height: defaults::max_height(),
        }
    }
}

impl GridSection {
    /// Check values that deserialize fine but cannot describe a grid.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let vertical = self.vertical_resolution.unwrap_or(self.resolution);
        if !(self.resolution > 0.0 && vertical > 0.0) {
            return Err(ConfigLoadError::Invalid(format!(
                "resolution must be positive (got {}, vertical {})",
                self.resolution, vertical
            )));
        }
        if self.num_cells_x == 0 || self.num_cells_y == 0 {
            return Err(ConfigLoadError::Invalid(format!(
                "grid must have at least one column (got {} x {})",
                self.num_cells_x, self.num_cells_y
            )));
        }
        if self.origin_mode != "center" && self.origin_mode != "corner" {
            return Err(ConfigLoadError::Invalid(format!(
                "unknown origin_mode '{}', expected 'center' or 'corner'",
                self.origin_mode
            )));
        }
        if !(self.min_height.is_finite() && self.max_height.is_finite()) {
            return Err(ConfigLoadError::Invalid(format!(
                "height band must be finite (got {} to {})",
                self.min_height, self.max_height
            )));
        }
        if self.min_height > self.max_height {
            return Err(ConfigLoadError::Invalid(format!(
                "min_height {} is above max_height {}",
                self.min_height, self.max_height
            )));
        }
        Ok(())
    }

    /// Convert to GridConfig
    pub fn to_grid_config(&self) -> GridConfig {
        let origin = if self.origin_mode == "corner" {
            Some(Vector3::new(self.origin_x, self.origin_y, self.origin_z))
        } else {
            None // Centered
        };

        GridConfig {
            resolution: Vector3::new(
                self.resolution,
                self.resolution,
                self.vertical_resolution.unwrap_or(self.resolution),
            ),
            num_cells: Vector2::new(self.num_cells_x, self.num_cells_y),
            origin,
            height_range: [self.min_height, self.max_height],
            ..Default::default()
        }
    }
}
