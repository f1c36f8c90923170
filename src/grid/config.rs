//! Configuration types for the TSDF grid.

use approx::relative_eq;
use nalgebra::{Isometry3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing grid placements.
///
/// Poses accumulate floating point error through repeated composition, so
/// two grids are treated as sharing a frame when their placements agree
/// within this bound.
pub const FRAME_EPSILON: f64 = 1e-6;

/// Default vertical extent `[min, max]` of a grid (meters).
pub const DEFAULT_HEIGHT_RANGE: [f64; 2] = [-5.0, 5.0];

/// Grid configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridConfig {
    /// Meters per cell along each axis (e.g., 0.1 = 10cm cells)
    pub resolution: Vector3<f64>,

    /// Number of columns along X and Y
    pub num_cells: Vector2<u32>,

    /// Grid-frame position of the corner of cell (0, 0, 0).
    /// If None, the grid is centered on the grid-frame origin.
    pub origin: Option<Vector3<f64>>,

    /// Vertical extent `[min, max]` in meters that columns may store.
    /// Must be finite: it bounds the cells a single ray can allocate.
    pub height_range: [f64; 2],

    /// Placement of the grid frame in the enclosing map frame
    pub local_frame: Isometry3<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: Vector3::repeat(0.1),    // 10cm voxels
            num_cells: Vector2::new(200, 200),   // 20m x 20m
            origin: None,                        // Centered at origin
            height_range: DEFAULT_HEIGHT_RANGE,
            local_frame: Isometry3::identity(),
        }
    }
}

impl GridConfig {
    /// Create a configuration for a specific footprint (in meters) with cubic voxels.
    pub fn for_area(width_m: f64, depth_m: f64, resolution: f64) -> Self {
        let width = (width_m / resolution).ceil() as u32;
        let depth = (depth_m / resolution).ceil() as u32;

        Self {
            resolution: Vector3::repeat(resolution),
            num_cells: Vector2::new(width, depth),
            ..Default::default()
        }
    }

    /// Calculate the origin for a centered grid.
    ///
    /// X and Y are centered on the grid-frame origin. Z is offset by half a
    /// cell so that height 0 lies on a cell center.
    pub fn centered_origin(&self) -> Vector3<f64> {
        Vector3::new(
            -(self.num_cells.x as f64 * self.resolution.x) / 2.0,
            -(self.num_cells.y as f64 * self.resolution.y) / 2.0,
            -self.resolution.z / 2.0,
        )
    }

    /// Get the effective origin (uses centered_origin if origin is None)
    pub fn effective_origin(&self) -> Vector3<f64> {
        self.origin.unwrap_or_else(|| self.centered_origin())
    }

    /// Inclusive range of vertical indices covered by `height_range`.
    pub fn vertical_index_range(&self) -> (i32, i32) {
        let [min, max] = self.height_range;
        let origin_z = self.effective_origin().z;
        let lo = ((min - origin_z) / self.resolution.z).floor();
        let hi = ((max - origin_z) / self.resolution.z).floor();
        (lo as i32, hi as i32)
    }

    /// Total number of columns.
    pub fn column_count(&self) -> usize {
        self.num_cells.x as usize * self.num_cells.y as usize
    }

    /// True if a grid with the given placement, extent and resolution can be
    /// merged with this one cell-for-cell.
    pub fn has_same_frame(
        &self,
        local_frame: &Isometry3<f64>,
        num_cells: &Vector2<u32>,
        resolution: &Vector3<f64>,
    ) -> bool {
        self.resolution == *resolution
            && self.num_cells == *num_cells
            && relative_eq!(self.local_frame, *local_frame, epsilon = FRAME_EPSILON)
    }

    /// Shorthand for [`GridConfig::has_same_frame`] against another configuration.
    pub fn is_compatible(&self, other: &GridConfig) -> bool {
        self.has_same_frame(&other.local_frame, &other.num_cells, &other.resolution)
    }
}

/// Fusion parameters shared by every merge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Half width (meters) of the band around a surface that receives updates.
    /// Rays are followed this far past the measured point.
    #[serde(default = "default_truncation")]
    pub truncation: f32,

    /// Lower bound on the variance left in a seeded cell.
    #[serde(default = "default_min_variance")]
    pub min_variance: f32,
}

fn default_truncation() -> f32 {
    1.0
}
fn default_min_variance() -> f32 {
    0.001
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            truncation: default_truncation(),
            min_variance: default_min_variance(),
        }
    }
}

/// Full map configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// Grid configuration (extent, resolution, placement)
    pub grid: GridConfig,
    /// Fusion parameters
    #[serde(default)]
    pub fusion: FusionConfig,
}
