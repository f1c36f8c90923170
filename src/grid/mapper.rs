//! Voxel grid coordinate mapping.

use nalgebra::{Vector2, Vector3};

use crate::core::{ColumnIndex, VoxelIndex};

use super::config::GridConfig;
use super::traits::{Bounds, VoxelMapper};

/// Regular voxel grid layout.
///
/// The grid uses a coordinate system where:
/// - (0, 0, 0) has its corner at `origin` in grid-frame coordinates
/// - Index axes are aligned with the grid-frame axes
/// - Cell (x, y, z) covers `origin + [x, x+1) * resolution` per axis
///
/// Only X and Y are bounded (by `num_cells`); the vertical axis is bounded
/// by the column storage, if at all.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    resolution: Vector3<f64>,
    /// Pre-computed 1.0 / resolution for faster point-to-index conversion.
    inv_resolution: Vector3<f64>,
    num_cells: Vector2<u32>,
    origin: Vector3<f64>,
}

impl VoxelGrid {
    /// Create a new grid layout.
    pub fn new(resolution: Vector3<f64>, num_cells: Vector2<u32>, origin: Vector3<f64>) -> Self {
        Self {
            resolution,
            inv_resolution: resolution.map(|r| 1.0 / r),
            num_cells,
            origin,
        }
    }

    /// Create a grid layout from configuration.
    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.resolution, config.num_cells, config.effective_origin())
    }

    /// Number of columns along X and Y.
    #[inline]
    pub fn num_cells(&self) -> Vector2<u32> {
        self.num_cells
    }

    /// Grid-frame corner of cell (0, 0, 0).
    #[inline]
    pub fn origin(&self) -> Vector3<f64> {
        self.origin
    }

    /// True if the column lies inside the grid extent.
    #[inline]
    pub fn contains_column(&self, xy: ColumnIndex) -> bool {
        xy.x >= 0
            && xy.y >= 0
            && (xy.x as u32) < self.num_cells.x
            && (xy.y as u32) < self.num_cells.y
    }

    /// Grid-frame bounds of the column extent: (min_corner, max_corner) in X/Y.
    pub fn bounds(&self) -> (Vector2<f64>, Vector2<f64>) {
        let min = self.origin.xy();
        let max = Vector2::new(
            self.origin.x + self.num_cells.x as f64 * self.resolution.x,
            self.origin.y + self.num_cells.y as f64 * self.resolution.y,
        );
        (min, max)
    }
}

impl VoxelMapper for VoxelGrid {
    fn to_index(&self, point: &Vector3<f64>, bounds: Bounds) -> Option<VoxelIndex> {
        let scaled = (point - self.origin).component_mul(&self.inv_resolution);

        let mut index = VoxelIndex::default();
        for axis in 0..3 {
            let cell = scaled[axis].floor();
            // Rejects NaN and infinities as well as values outside i32
            if !(cell >= i32::MIN as f64 && cell <= i32::MAX as f64) {
                return None;
            }
            *index.axis_mut(axis) = cell as i32;
        }

        if bounds == Bounds::Checked && !self.contains_column(index.column()) {
            return None;
        }
        Some(index)
    }

    fn from_index(&self, index: VoxelIndex) -> Option<Vector3<f64>> {
        if !self.contains_column(index.column()) {
            return None;
        }
        let cell = Vector3::new(index.x as f64, index.y as f64, index.z as f64);
        Some(self.origin + (cell.add_scalar(0.5)).component_mul(&self.resolution))
    }

    #[inline]
    fn resolution(&self) -> Vector3<f64> {
        self.resolution
    }
}
