//! Vertical column of lazily allocated cells.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::grid::traits::VoxelColumn;

use super::cell::TsdfCell;

/// Vertical placement shared by every column of a store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalLayout {
    /// Grid-frame height of the bottom face of cell z = 0
    pub origin_z: f64,
    /// Cell height (meters)
    pub resolution_z: f64,
    /// Inclusive range of z indices a column may hold
    pub z_range: (i32, i32),
}

impl VerticalLayout {
    /// True if a column may hold cell `z`.
    #[inline]
    pub fn contains(&self, z: i32) -> bool {
        z >= self.z_range.0 && z <= self.z_range.1
    }

    /// The z indices a column may hold.
    #[inline]
    pub fn levels(&self) -> RangeInclusive<i32> {
        self.z_range.0..=self.z_range.1
    }
}

/// Cells of one (x, y) column, keyed by vertical index.
///
/// Only cells that have been touched are allocated.
#[derive(Clone, Debug)]
pub struct Column {
    cells: BTreeMap<i32, TsdfCell>,
    layout: VerticalLayout,
}

impl Column {
    /// Create an empty column.
    pub fn new(layout: VerticalLayout) -> Self {
        Self {
            cells: BTreeMap::new(),
            layout,
        }
    }

    /// Cell at `z`, if it has been allocated.
    #[inline]
    pub fn cell(&self, z: i32) -> Option<&TsdfCell> {
        self.cells.get(&z)
    }

    /// Number of allocated cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no cell has been allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate allocated cells bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &TsdfCell)> {
        self.cells.iter().map(|(&z, cell)| (z, cell))
    }
}

impl VoxelColumn for Column {
    fn cell_center_at(&self, z: i32) -> Option<f64> {
        if !self.layout.contains(z) {
            return None;
        }
        Some(self.layout.origin_z + (z as f64 + 0.5) * self.layout.resolution_z)
    }

    fn cell_at(&mut self, z: i32) -> &mut TsdfCell {
        self.cells.entry(z).or_default()
    }
}
