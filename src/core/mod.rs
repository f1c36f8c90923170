//! Core types for the VastuTSDF library.
//!
//! ## Frames
//!
//! - **Sensor frame**: coordinates as delivered by the range sensor.
//! - **Grid frame**: the frame the voxel grid is laid out in. Axes are
//!   aligned with the voxel index axes; Z is vertical.
//!
//! A [`PointCloud`] is moved from the sensor frame into the grid frame with
//! an [`nalgebra::Isometry3`] supplied alongside the cloud.
//!
//! ## Addresses
//!
//! - [`VoxelIndex`]: integer (x, y, z) address of one cell
//! - [`ColumnIndex`]: integer (x, y) address of one vertical column

mod cloud;
mod index;

pub use cloud::PointCloud;
pub use index::{ColumnIndex, VoxelIndex};
