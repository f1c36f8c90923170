//! Sparse storage for the TSDF grid.
//!
//! The grid is stored column-wise: a bounded (x, y) extent of vertical
//! columns, each holding only the cells that have been observed.
//!
//! ```text
//!          z
//!          ▲      ┌─┐
//!          │  ┌─┐ │■│        ■ = allocated TsdfCell
//!          │  │■│ │■│ ┌─┐
//!          │  │■│ └─┘ │■│    columns are created on first write,
//!          │  └─┘     └─┘    cells on first touch
//!          └──────────────▶ (x, y)
//! ```
//!
//! ## Key Types
//!
//! - [`ColumnStore`]: (x, y) extent of lazily created columns
//! - [`Column`]: vertical run of cells keyed by z index
//! - [`TsdfCell`]: fused signed distance and variance of one voxel

mod cell;
mod column;
mod store;

pub use cell::{DEFAULT_CELL_MIN_VARIANCE, DEFAULT_CELL_TRUNCATION, TsdfCell};
pub use column::{Column, VerticalLayout};
pub use store::ColumnStore;
