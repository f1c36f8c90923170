//! # VastuTSDF
//!
//! Truncated signed distance field (TSDF) mapping on a sparse 3D voxel grid.
//!
//! ## Overview
//!
//! Range measurements (a surface point plus the sensor position it was
//! seen from) are fused into a persistent grid of signed distances:
//!
//! - Cells in front of the surface receive a **positive** distance
//! - Cells near the surface are pulled toward **zero**
//! - Cells up to one truncation band **behind** the surface go negative
//!
//! Each cell stores a Gaussian estimate (distance, variance) that is
//! refined by inverse-variance weighting as observations accumulate.
//!
//! ## Features
//!
//! - **Sparse Columns**: (x, y) columns and their cells are allocated on first touch
//! - **Bounded Updates**: each measurement touches `O(truncation / resolution)`
//!   cells past the surface plus the free space in front of it
//! - **Failure Isolation**: a bad or out-of-range point never aborts a cloud
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nalgebra::{Isometry3, Vector3};
//! use vastu_tsdf::{MapConfig, PointCloud, TsdfMap};
//!
//! let mut map = TsdfMap::new(MapConfig::default());
//!
//! let cloud = PointCloud::new(Vector3::zeros(), points);
//! let stats = map.merge_cloud(&cloud, &Isometry3::identity(), 0.01);
//!
//! println!("Updated {} cells", stats.cells_updated);
//! ```
//!
//! ## Coordinate System
//!
//! - X, Y: horizontal grid axes, bounded by `num_cells`
//! - Z: vertical, bounded by `height_range`
//! - All map-side geometry is `f64`; sensor clouds are `f32`

#![warn(missing_docs)]

// Core types
pub mod core;

// Grid layout, storage and fusion
pub mod grid;

// Unified configuration
pub mod config;

// Error types
pub mod error;

// Re-export commonly used types
pub use crate::core::{ColumnIndex, PointCloud, VoxelIndex};

pub use grid::{
    Bounds, Column, ColumnStorage, ColumnStore, FusionConfig, GridConfig, MapConfig, RayElement,
    TsdfCell, VoxelColumn, VoxelGrid, VoxelMapper,
};

pub use config::{ConfigLoadError, TsdfSettings};

pub use error::{FusionError, GeometryError};

use nalgebra::{Isometry3, Vector2, Vector3};

/// Outcome of fusing a single measurement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointUpdate {
    /// Cells that received an observation
    pub cells_updated: usize,
    /// The terminal cell was seeded
    pub terminal_seeded: bool,
    /// The walk stopped at a column outside the storage
    pub ray_clipped: bool,
    /// Levels skipped inside located columns
    pub lookups_failed: usize,
}

/// Diagnostics accumulated while fusing measurements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Measurements fused
    pub points_merged: usize,
    /// Measurements outside the grid
    pub points_out_of_bounds: usize,
    /// Measurements rejected for degenerate or inconsistent geometry
    pub points_rejected: usize,
    /// Measurements not processed because of a point limit
    pub points_skipped: usize,
    /// Total cells updated
    pub cells_updated: usize,
    /// Terminal cells seeded
    pub terminal_cells_seeded: usize,
    /// Terminal cells that could not be located
    pub terminal_cells_skipped: usize,
    /// Rays that left the storage extent
    pub rays_clipped: usize,
    /// Levels skipped inside located columns
    pub cell_lookups_failed: usize,
}

impl MergeStats {
    /// Account for one fused measurement.
    pub fn record(&mut self, update: &PointUpdate) {
        self.points_merged += 1;
        self.cells_updated += update.cells_updated;
        if update.terminal_seeded {
            self.terminal_cells_seeded += 1;
        } else {
            self.terminal_cells_skipped += 1;
        }
        if update.ray_clipped {
            self.rays_clipped += 1;
        }
        self.cell_lookups_failed += update.lookups_failed;
    }

    /// Account for one failed measurement.
    pub fn record_error(&mut self, error: &FusionError) {
        match error {
            FusionError::OutOfBounds { .. } => self.points_out_of_bounds += 1,
            FusionError::Geometry(_) => self.points_rejected += 1,
        }
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: &MergeStats) {
        self.points_merged += other.points_merged;
        self.points_out_of_bounds += other.points_out_of_bounds;
        self.points_rejected += other.points_rejected;
        self.points_skipped += other.points_skipped;
        self.cells_updated += other.cells_updated;
        self.terminal_cells_seeded += other.terminal_cells_seeded;
        self.terminal_cells_skipped += other.terminal_cells_skipped;
        self.rays_clipped += other.rays_clipped;
        self.cell_lookups_failed += other.cell_lookups_failed;
    }

    /// Measurements that failed for any reason.
    pub fn points_failed(&self) -> usize {
        self.points_out_of_bounds + self.points_rejected
    }
}

/// The main TSDF map
///
/// This is the primary type for interacting with the map. All mutation
/// goes through `&mut self`, so a map has a single writer at any time;
/// share it across threads behind a lock.
#[derive(Clone, Debug)]
pub struct TsdfMap {
    /// Coordinate mapping
    grid: VoxelGrid,
    /// Column storage
    storage: ColumnStore,
    /// Configuration
    config: MapConfig,
}

impl TsdfMap {
    /// Create a new, empty map
    pub fn new(config: MapConfig) -> Self {
        let grid = VoxelGrid::from_config(&config.grid);
        let storage = ColumnStore::from_config(&config.grid);

        Self {
            grid,
            storage,
            config,
        }
    }

    /// Get the coordinate mapping
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Get the column storage
    pub fn storage(&self) -> &ColumnStore {
        &self.storage
    }

    /// Get the configuration
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Voxel size along each axis (meters)
    pub fn resolution(&self) -> Vector3<f64> {
        self.grid.resolution()
    }

    /// Number of columns along X and Y
    pub fn num_cells(&self) -> Vector2<u32> {
        self.config.grid.num_cells
    }

    /// Placement of the grid frame in the enclosing map frame
    pub fn local_frame(&self) -> &Isometry3<f64> {
        &self.config.grid.local_frame
    }

    // =========================================================================
    // FUSION
    // =========================================================================

    /// Fuse a single grid-frame measurement.
    ///
    /// # Arguments
    /// * `sensor_origin` - Sensor position (grid frame)
    /// * `measurement` - Measured surface point (grid frame)
    /// * `variance` - Measurement variance
    ///
    /// # Returns
    /// What was touched, or why the measurement was rejected. A rejected
    /// measurement leaves the map unchanged.
    pub fn merge_point(
        &mut self,
        sensor_origin: &Vector3<f64>,
        measurement: &Vector3<f64>,
        variance: f32,
    ) -> error::Result<PointUpdate> {
        grid::tsdf_update::merge_point(
            &self.grid,
            &mut self.storage,
            &self.config.fusion,
            sensor_origin,
            measurement,
            variance,
        )
    }

    /// Fuse every measurement of a point cloud.
    ///
    /// # Arguments
    /// * `cloud` - Measurements and sensor origin (sensor frame)
    /// * `sensor_to_grid` - Transform from the sensor frame to the grid frame
    /// * `variance` - Measurement variance applied to every point
    ///
    /// # Returns
    /// Statistics about the points and cells processed. Failing points are
    /// counted, never propagated.
    pub fn merge_cloud(
        &mut self,
        cloud: &PointCloud,
        sensor_to_grid: &Isometry3<f64>,
        variance: f32,
    ) -> MergeStats {
        self.merge_cloud_with_limit(cloud, sensor_to_grid, variance, None)
    }

    /// Fuse at most `max_points` measurements of a point cloud.
    ///
    /// Lets callers bound the time spent per cloud; measurements past the
    /// limit are counted as skipped and leave the map untouched.
    pub fn merge_cloud_with_limit(
        &mut self,
        cloud: &PointCloud,
        sensor_to_grid: &Isometry3<f64>,
        variance: f32,
        max_points: Option<usize>,
    ) -> MergeStats {
        grid::tsdf_update::merge_cloud(
            &self.grid,
            &mut self.storage,
            &self.config.fusion,
            cloud,
            sensor_to_grid,
            variance,
            max_points,
        )
    }

    /// True if a map with the given placement, extent and resolution can be
    /// merged with this one without resampling.
    pub fn has_same_frame(
        &self,
        local_frame: &Isometry3<f64>,
        num_cells: &Vector2<u32>,
        resolution: &Vector3<f64>,
    ) -> bool {
        self.config
            .grid
            .has_same_frame(local_frame, num_cells, resolution)
    }

    // =========================================================================
    // FUSION PARAMETERS
    // =========================================================================

    /// Truncation band (meters)
    pub fn truncation(&self) -> f32 {
        self.config.fusion.truncation
    }

    /// Set the truncation band (meters). Takes effect on the next merge.
    pub fn set_truncation(&mut self, truncation: f32) {
        self.config.fusion.truncation = truncation;
    }

    /// Variance floor for seeded cells
    pub fn min_variance(&self) -> f32 {
        self.config.fusion.min_variance
    }

    /// Set the variance floor for seeded cells. Takes effect on the next merge.
    pub fn set_min_variance(&mut self, min_variance: f32) {
        self.config.fusion.min_variance = min_variance;
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Cell at `index`, if it has been observed
    pub fn cell(&self, index: VoxelIndex) -> Option<TsdfCell> {
        self.storage
            .cell(index)
            .filter(|cell| cell.is_observed())
            .copied()
    }

    /// Cell containing a grid-frame point, if it has been observed
    pub fn cell_at_point(&self, point: &Vector3<f64>) -> Option<TsdfCell> {
        let index = self.grid.to_index(point, Bounds::Checked)?;
        self.cell(index)
    }

    /// Fused signed distance at a grid-frame point, if observed
    pub fn distance_at(&self, point: &Vector3<f64>) -> Option<f32> {
        self.cell_at_point(point).map(|cell| cell.distance)
    }

    /// Iterate all observed cells (unordered)
    pub fn observed_cells(&self) -> impl Iterator<Item = (VoxelIndex, &TsdfCell)> {
        self.storage.iter().filter(|(_, cell)| cell.is_observed())
    }

    /// Observed cells within `max_abs_distance` of a surface, with their
    /// grid-frame centers.
    pub fn surface_cells(&self, max_abs_distance: f32) -> Vec<(Vector3<f64>, TsdfCell)> {
        self.observed_cells()
            .filter(|(_, cell)| cell.distance.abs() <= max_abs_distance)
            .filter_map(|(index, cell)| Some((self.grid.from_index(index)?, *cell)))
            .collect()
    }

    /// Number of allocated columns
    pub fn column_count(&self) -> usize {
        self.storage.column_count()
    }

    /// Number of observed cells
    pub fn observed_cell_count(&self) -> usize {
        self.observed_cells().count()
    }

    /// Drop all cells
    pub fn clear(&mut self) {
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_config() -> MapConfig {
        MapConfig {
            grid: GridConfig {
                resolution: Vector3::repeat(0.1),
                num_cells: Vector2::new(40, 40),
                origin: Some(Vector3::new(-2.05, -2.05, -0.05)),
                ..Default::default()
            },
            fusion: FusionConfig {
                truncation: 0.3,
                min_variance: 0.01,
            },
        }
    }

    #[test]
    fn test_map_creation() {
        let map = TsdfMap::new(MapConfig::default());

        assert_eq!(map.resolution(), Vector3::repeat(0.1));
        assert_eq!(map.num_cells(), Vector2::new(200, 200));
        assert_eq!(map.column_count(), 0);
        assert_eq!(map.observed_cell_count(), 0);
    }

    #[test]
    fn test_map_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TsdfMap>();
    }

    #[test]
    fn test_parameter_accessors() {
        let mut map = TsdfMap::new(test_config());
        assert_eq!(map.truncation(), 0.3);
        assert_eq!(map.min_variance(), 0.01);

        map.set_truncation(0.5);
        map.set_min_variance(0.002);
        assert_eq!(map.truncation(), 0.5);
        assert_eq!(map.min_variance(), 0.002);
    }

    #[test]
    fn test_truncation_change_applies_to_next_merge() {
        let mut map = TsdfMap::new(test_config());
        let origin = Vector3::zeros();

        map.merge_point(&origin, &Vector3::new(1.0, 0.0, 0.0), 0.02)
            .unwrap();
        assert!(map.distance_at(&Vector3::new(0.0, 1.5, 0.0)).is_none());

        map.set_truncation(0.5);
        map.merge_point(&origin, &Vector3::new(0.0, 1.0, 0.0), 0.02)
            .unwrap();

        // Band now reaches 0.5 past the surface
        let end = map.cell_at_point(&Vector3::new(0.0, 1.5, 0.0)).unwrap();
        assert_relative_eq!(end.distance, -0.5, epsilon = 1e-5);
        assert!(map.distance_at(&Vector3::new(0.0, 1.6, 0.0)).is_none());
    }

    #[test]
    fn test_has_same_frame() {
        let map = TsdfMap::new(test_config());
        let other = test_config();

        assert!(map.has_same_frame(
            &other.grid.local_frame,
            &other.grid.num_cells,
            &other.grid.resolution
        ));
        assert!(!map.has_same_frame(
            &Isometry3::translation(0.0, 0.0, 1.0),
            &other.grid.num_cells,
            &other.grid.resolution
        ));
    }

    #[test]
    fn test_queries() {
        let mut map = TsdfMap::new(test_config());
        map.merge_point(&Vector3::zeros(), &Vector3::new(1.0, 0.0, 0.0), 0.02)
            .unwrap();

        assert_eq!(map.observed_cell_count(), 14);
        assert!(map.cell(VoxelIndex::new(30, 20, 0)).is_some());
        assert!(map.cell(VoxelIndex::new(30, 21, 0)).is_none());
        assert!(map.cell_at_point(&Vector3::new(50.0, 0.0, 0.0)).is_none());

        // Surface cell at x = 1.0 plus x = 0.9 and 1.1 within one cell width
        let surface = map.surface_cells(0.1 + 1e-4);
        assert_eq!(surface.len(), 3);
        for (center, cell) in &surface {
            assert!((center.x - 1.0).abs() < 0.15);
            assert!(cell.distance.abs() <= 0.1 + 1e-4);
        }

        map.clear();
        assert_eq!(map.observed_cell_count(), 0);
        assert!(map.distance_at(&Vector3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_merge_stats_merge() {
        let mut a = MergeStats::default();
        a.record(&PointUpdate {
            cells_updated: 4,
            terminal_seeded: true,
            ray_clipped: false,
            lookups_failed: 1,
        });
        a.record_error(&FusionError::Geometry(GeometryError::DegenerateRay));

        let mut b = MergeStats::default();
        b.record(&PointUpdate {
            cells_updated: 2,
            terminal_seeded: false,
            ray_clipped: true,
            lookups_failed: 0,
        });
        b.record_error(&FusionError::OutOfBounds {
            point: Vector3::zeros(),
        });

        a.merge(&b);
        assert_eq!(a.points_merged, 2);
        assert_eq!(a.cells_updated, 6);
        assert_eq!(a.terminal_cells_seeded, 1);
        assert_eq!(a.terminal_cells_skipped, 1);
        assert_eq!(a.rays_clipped, 1);
        assert_eq!(a.cell_lookups_failed, 1);
        assert_eq!(a.points_failed(), 2);
    }
}
