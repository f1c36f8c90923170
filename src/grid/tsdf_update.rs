//! Range measurement fusion for the TSDF grid.
//!
//! Each measurement is turned into a ray from the sensor origin, extended
//! one truncation band past the measured point:
//!
//! ```text
//!  origin                      measurement       end
//!    ●───────────────────────────────●─────────────●
//!    │◄──────── sd > 0 ─────────────►│◄── sd < 0 ─►│
//!                                         truncation
//! ```
//!
//! Every voxel on the ray receives the observation
//! `sd = ray_length - |cell_center - origin|`. The voxel holding the
//! extended end is seeded with the map's truncation and variance floor;
//! all others use the plain fusion form.
//!
//! ## Lookup failures
//!
//! Three kinds of lookup can fail along the way and each is handled where
//! it happens:
//!
//! | Site | Handling | Counter |
//! |---|---|---|
//! | terminal voxel | skip the seeding update | `terminal_cells_skipped` |
//! | column on the ray | stop walking this ray | `rays_clipped` |
//! | z level in a column | skip that level only | `cell_lookups_failed` |
//!
//! The column extent is convex and the ray starts inside it, so the first
//! unresolvable column means the rest of the ray is outside as well. The
//! vertical range gives no such guarantee: a sensor mounted above the stored
//! band still sees cells inside it further along the ray.
//!
//! Levels outside the storage's vertical band are counted without being
//! visited, and a column is only created when the ray holds at least one
//! level inside the band. A steep ray therefore costs the same as a short
//! one, however far past the band it ends.

use nalgebra::{Isometry3, Vector3};

use crate::core::PointCloud;
use crate::error::{FusionError, GeometryError, Result};
use crate::grid::config::FusionConfig;
use crate::grid::traits::{Bounds, ColumnStorage, VoxelColumn, VoxelMapper};
use crate::grid::traversal::RayTraversal;
use crate::{MergeStats, PointUpdate};

/// Fuse one grid-frame measurement into the storage.
///
/// # Arguments
/// * `mapper` - Grid coordinate mapping
/// * `storage` - Column storage receiving the updates
/// * `fusion` - Truncation and variance floor
/// * `sensor_origin` - Sensor position (grid frame)
/// * `measurement` - Measured surface point (grid frame)
/// * `variance` - Measurement variance (> 0)
///
/// # Errors
/// * [`GeometryError::DegenerateRay`] if the measurement equals the origin
/// * [`FusionError::OutOfBounds`] if the origin lies outside the grid or the
///   ray end is not representable
///
/// Nothing is written when an error is returned.
pub fn merge_point<M, S>(
    mapper: &M,
    storage: &mut S,
    fusion: &FusionConfig,
    sensor_origin: &Vector3<f64>,
    measurement: &Vector3<f64>,
    variance: f32,
) -> Result<PointUpdate>
where
    M: VoxelMapper,
    S: ColumnStorage,
{
    let offset = measurement - sensor_origin;
    let ray_length = offset.norm();
    if !(ray_length > 0.0 && ray_length.is_finite()) {
        return Err(GeometryError::DegenerateRay.into());
    }
    let direction = offset / ray_length;
    let end_point = measurement + direction * f64::from(fusion.truncation);

    let out_of_bounds = || FusionError::OutOfBounds {
        point: *measurement,
    };
    let start_idx = mapper
        .to_index(sensor_origin, Bounds::Checked)
        .ok_or_else(out_of_bounds)?;
    let end_idx = mapper
        .to_index(&end_point, Bounds::Unchecked)
        .ok_or_else(out_of_bounds)?;
    let start_center = mapper
        .from_index(start_idx)
        .ok_or(GeometryError::InconsistentGrid(start_idx))?;

    let mut ray = RayTraversal::new(
        &mapper.resolution(),
        sensor_origin,
        start_idx,
        &start_center,
        &end_point,
        end_idx,
    )
    .peekable();
    if ray.peek().is_none() {
        return Err(GeometryError::EmptyTraversal.into());
    }

    let mut update = PointUpdate::default();
    let levels = storage.levels();

    // Terminal voxel: seeded with the map's band and floor, best effort
    if levels.contains(&end_idx.z)
        && let Some(mut center) = mapper.from_index(end_idx)
        && let Some(column) = storage.column_at(end_idx.column())
        && let Some(z) = column.cell_center_at(end_idx.z)
    {
        center.z = z;
        let signed_distance = ray_length - (center - sensor_origin).norm();
        column.cell_at(end_idx.z).fuse_seed(
            signed_distance as f32,
            variance,
            fusion.truncation,
            fusion.min_variance,
        );
        update.cells_updated += 1;
        update.terminal_seeded = true;
    } else {
        log::trace!("Terminal voxel {} is outside the storage", end_idx);
    }

    // Interior voxels, in traversal order
    for element in ray {
        let Some(mut center) = mapper.from_index(element.column.with_z(element.z_first)) else {
            // Rest of the ray is outside the grid
            update.ray_clipped = true;
            break;
        };

        let inside = element.clip_levels(*levels.start(), *levels.end());
        let mut outside = element.len() - inside.map_or(0, |run| run.len());
        if element.column == end_idx.column()
            && element.contains_level(end_idx.z)
            && !levels.contains(&end_idx.z)
        {
            // The terminal voxel is never a lookup failure
            outside -= 1;
        }
        if outside > 0 {
            log::trace!(
                "{} levels of column {} outside the vertical band",
                outside,
                element.column
            );
            update.lookups_failed += outside;
        }

        let Some(run) = inside else {
            continue;
        };
        let Some(column) = storage.column_at(element.column) else {
            update.ray_clipped = true;
            break;
        };

        for z in run.z_indices() {
            if element.column.with_z(z) == end_idx {
                continue;
            }
            let Some(z_center) = column.cell_center_at(z) else {
                log::trace!("No cell center for z = {} in column {}", z, element.column);
                update.lookups_failed += 1;
                continue;
            };
            center.z = z_center;
            let signed_distance = ray_length - (center - sensor_origin).norm();
            column.cell_at(z).fuse(signed_distance as f32, variance);
            update.cells_updated += 1;
        }
    }

    Ok(update)
}

/// Fuse a point cloud into the storage.
///
/// The sensor origin is transformed once; each point is transformed and
/// merged with [`merge_point`]. A failing point is logged and counted but
/// never aborts the rest of the cloud. At most `max_points` measurements
/// are processed when a limit is given; the rest are counted as skipped.
///
/// `fusion` is read per point, so callers that adjust the parameters
/// between calls see the change on the next point merged.
pub fn merge_cloud<M, S>(
    mapper: &M,
    storage: &mut S,
    fusion: &FusionConfig,
    cloud: &PointCloud,
    sensor_to_grid: &Isometry3<f64>,
    variance: f32,
    max_points: Option<usize>,
) -> MergeStats
where
    M: VoxelMapper,
    S: ColumnStorage,
{
    let mut stats = MergeStats::default();
    let origin = cloud.origin_in(sensor_to_grid);
    let limit = max_points.unwrap_or(usize::MAX);

    // TODO: fold the uncertainty of sensor_to_grid into the measurement variance
    for (i, point) in cloud.points_in(sensor_to_grid).enumerate() {
        if i >= limit {
            stats.points_skipped = cloud.len() - i;
            break;
        }

        match merge_point(mapper, storage, fusion, &origin, &point, variance) {
            Ok(update) => stats.record(&update),
            Err(e) => {
                match &e {
                    FusionError::OutOfBounds { .. } => log::debug!("Point {}: {}", i, e),
                    FusionError::Geometry(_) => log::warn!("Point {}: {}", i, e),
                }
                stats.record_error(&e);
            }
        }
    }

    log::debug!(
        "Merged {}/{} points ({} out of bounds, {} degenerate, {} skipped), {} cells updated",
        stats.points_merged,
        cloud.len(),
        stats.points_out_of_bounds,
        stats.points_rejected,
        stats.points_skipped,
        stats.cells_updated
    );

    stats
}
