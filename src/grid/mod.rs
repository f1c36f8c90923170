//! Sparse TSDF grid with range measurement fusion.
//!
//! This module provides the voxel layout, the column storage and the update
//! pipeline that turns range measurements into signed distance estimates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                PointCloud + sensor_to_grid                  │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                ▼
//!                     ┌───────────────────────┐
//!                     │     tsdf_update       │
//!                     │  (per point, isolated)│
//!                     └─────┬───────────┬─────┘
//!                           │           │
//!              ┌────────────▼──┐     ┌──▼────────────┐
//!              │   traversal   │     │  VoxelMapper  │
//!              │ (3D DDA, by   │     │ (point ⇄ idx) │
//!              │   column)     │     └───────────────┘
//!              └───────┬───────┘
//!                      ▼
//!            ┌───────────────────────┐
//!            │     ColumnStore       │
//!            │ (lazy columns/cells)  │
//!            └───────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`VoxelGrid`]: Point/index conversion for a regular axis-aligned grid
//! - [`ColumnStore`]: Bounded (x, y) extent of sparse vertical columns
//! - [`TsdfCell`]: Signed distance and variance of one voxel
//! - [`GridConfig`]: Extent, resolution, origin and placement
//! - [`FusionConfig`]: Truncation band and variance floor
//! - [`MapConfig`]: Combined configuration for the full map
//!
//! ## Fusion Model
//!
//! ```text
//! sd      = |P - O| - |c - O|                  # per cell center c
//! d'      = (d * v_obs + sd * v) / (v + v_obs)
//! v'      = max(v * v_obs / (v + v_obs), floor)
//! ```

mod config;
pub mod mapper;
pub mod storage;
pub mod traits;
pub mod traversal;
pub mod tsdf_update;

pub use config::{DEFAULT_HEIGHT_RANGE, FRAME_EPSILON, FusionConfig, GridConfig, MapConfig};
pub use mapper::VoxelGrid;
pub use storage::{Column, ColumnStore, TsdfCell, VerticalLayout};
pub use traits::{Bounds, ColumnStorage, VoxelColumn, VoxelMapper};
pub use traversal::{RayElement, RayTraversal, compute_ray};
