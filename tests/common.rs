//! Test utilities for VastuTSDF.
//!
//! This module provides helpers for creating grids, clouds and map snapshots.

#![allow(dead_code)]

use std::collections::HashMap;

use nalgebra::{Vector2, Vector3};
use vastu_tsdf::{FusionConfig, GridConfig, MapConfig, TsdfCell, TsdfMap, VoxelIndex};

/// 40 x 40 columns at 10cm covering x/y in [-2.05, 1.95).
///
/// Cell centers sit on multiples of 0.1, so test points never fall on a
/// cell boundary.
pub fn aligned_config(truncation: f32, min_variance: f32) -> MapConfig {
    MapConfig {
        grid: GridConfig {
            resolution: Vector3::repeat(0.1),
            num_cells: Vector2::new(40, 40),
            origin: Some(Vector3::new(-2.05, -2.05, -0.05)),
            ..Default::default()
        },
        fusion: FusionConfig {
            truncation,
            min_variance,
        },
    }
}

/// Aligned map with a 0.3m band and a 0.01 variance floor.
pub fn aligned_map() -> TsdfMap {
    TsdfMap::new(aligned_config(0.3, 0.01))
}

/// Points on the plane x = `distance`, sampled every `step` meters over
/// y in [-half_width, half_width] and z in [0, height].
pub fn wall_points(distance: f32, half_width: f32, height: f32, step: f32) -> Vec<Vector3<f32>> {
    let ny = (2.0 * half_width / step).round() as i32;
    let nz = (height / step).round() as i32;

    let mut points = Vec::with_capacity(((ny + 1) * (nz + 1)) as usize);
    for iy in 0..=ny {
        for iz in 0..=nz {
            points.push(Vector3::new(
                distance,
                -half_width + iy as f32 * step,
                iz as f32 * step,
            ));
        }
    }
    points
}

/// Copy of every observed cell, keyed by index.
pub fn snapshot(map: &TsdfMap) -> HashMap<VoxelIndex, TsdfCell> {
    map.observed_cells().map(|(idx, cell)| (idx, *cell)).collect()
}
