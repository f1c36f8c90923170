//! Sparse column store implementation.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use nalgebra::Vector2;

use crate::core::{ColumnIndex, VoxelIndex};
use crate::grid::config::GridConfig;
use crate::grid::traits::ColumnStorage;

use super::cell::TsdfCell;
use super::column::{Column, VerticalLayout};

/// Sparse storage of TSDF columns over a bounded (x, y) extent.
///
/// Columns are allocated the first time they are written; cells inside a
/// column are allocated the first time they are touched. Reading never
/// allocates.
#[derive(Clone, Debug)]
pub struct ColumnStore {
    columns: HashMap<ColumnIndex, Column>,
    num_cells: Vector2<u32>,
    layout: VerticalLayout,
}

impl ColumnStore {
    /// Create an empty store.
    pub fn new(num_cells: Vector2<u32>, layout: VerticalLayout) -> Self {
        Self {
            columns: HashMap::new(),
            num_cells,
            layout,
        }
    }

    /// Create an empty store from grid configuration.
    pub fn from_config(config: &GridConfig) -> Self {
        let layout = VerticalLayout {
            origin_z: config.effective_origin().z,
            resolution_z: config.resolution.z,
            z_range: config.vertical_index_range(),
        };
        Self::new(config.num_cells, layout)
    }

    /// Vertical layout shared by all columns.
    #[inline]
    pub fn layout(&self) -> &VerticalLayout {
        &self.layout
    }

    #[inline]
    fn contains_column(&self, xy: ColumnIndex) -> bool {
        xy.x >= 0
            && xy.y >= 0
            && (xy.x as u32) < self.num_cells.x
            && (xy.y as u32) < self.num_cells.y
    }

    /// Column at `xy`, if it has been allocated.
    #[inline]
    pub fn column(&self, xy: ColumnIndex) -> Option<&Column> {
        self.columns.get(&xy)
    }

    /// Cell at `index`, if it has been allocated.
    pub fn cell(&self, index: VoxelIndex) -> Option<&TsdfCell> {
        self.columns.get(&index.column())?.cell(index.z)
    }

    /// Number of allocated columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of allocated cells across all columns.
    pub fn cell_count(&self) -> usize {
        self.columns.values().map(Column::len).sum()
    }

    /// Iterate all allocated cells (unordered across columns).
    pub fn iter(&self) -> impl Iterator<Item = (VoxelIndex, &TsdfCell)> {
        self.columns.iter().flat_map(|(xy, column)| {
            column
                .iter()
                .map(move |(z, cell)| (xy.with_z(z), cell))
        })
    }

    /// Drop all columns.
    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

impl ColumnStorage for ColumnStore {
    type Column = Column;

    fn column_at(&mut self, xy: ColumnIndex) -> Option<&mut Column> {
        if !self.contains_column(xy) {
            return None;
        }
        let layout = self.layout;
        Some(self.columns.entry(xy).or_insert_with(|| Column::new(layout)))
    }

    fn levels(&self) -> RangeInclusive<i32> {
        self.layout.levels()
    }
}
