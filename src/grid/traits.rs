//! Capability traits consumed by the fusion pipeline.
//!
//! The pipeline in [`crate::grid::tsdf_update`] only needs two things from a
//! grid: a coordinate mapping and per-column cell access. Splitting them
//! into traits lets alternative storages (or test doubles that fail on
//! purpose) be plugged in without touching the fusion logic.

use std::ops::RangeInclusive;

use nalgebra::Vector3;

use crate::core::{ColumnIndex, VoxelIndex};

use super::storage::TsdfCell;

/// How strictly a point is resolved to an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bounds {
    /// Fail unless the point lies inside the grid's column extent.
    Checked,
    /// Accept any point whose index is representable; the result may lie
    /// outside the storage extent.
    Unchecked,
}

/// Bidirectional mapping between grid-frame coordinates and voxel indices.
pub trait VoxelMapper {
    /// Resolve the voxel containing `point`.
    fn to_index(&self, point: &Vector3<f64>, bounds: Bounds) -> Option<VoxelIndex>;

    /// Grid-frame center of the voxel at `index`, if it lies inside the grid.
    fn from_index(&self, index: VoxelIndex) -> Option<Vector3<f64>>;

    /// Per-axis voxel size in meters.
    fn resolution(&self) -> Vector3<f64>;
}

/// One vertical column of cells.
pub trait VoxelColumn {
    /// Vertical center of cell `z`, or None if the column cannot hold it.
    fn cell_center_at(&self, z: i32) -> Option<f64>;

    /// Mutable access to cell `z`, created on first access.
    fn cell_at(&mut self, z: i32) -> &mut TsdfCell;
}

/// Sparse storage of columns, created lazily.
pub trait ColumnStorage {
    /// Column type held by this storage.
    type Column: VoxelColumn;

    /// Column at `xy`, created if absent. None if `xy` is outside the storage.
    fn column_at(&mut self, xy: ColumnIndex) -> Option<&mut Self::Column>;

    /// Vertical indices any column may hold. Checked before a column is
    /// created, so rays passing above or below the band allocate nothing.
    fn levels(&self) -> RangeInclusive<i32>;
}
