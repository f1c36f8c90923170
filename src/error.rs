//! Error types for VastuTSDF

use nalgebra::Vector3;
use thiserror::Error;

use crate::core::VoxelIndex;

/// Inconsistent or degenerate ray geometry.
///
/// None of these should occur for valid input on a consistent grid; they
/// point at a precondition violated upstream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Measurement coincides with the sensor origin, so the ray has no direction.
    #[error("degenerate ray: measurement coincides with the sensor origin")]
    DegenerateRay,

    /// Traversal produced no voxels for a non-degenerate segment.
    #[error("ray traversal produced no voxels")]
    EmptyTraversal,

    /// A validated index has no cell center.
    #[error("grid has no cell center for validated index {0}")]
    InconsistentGrid(VoxelIndex),
}

/// Failure to fuse a single measurement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    /// Degenerate or inconsistent ray geometry.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Sensor origin or truncated ray end is not representable in the grid.
    /// Expected near the map border.
    #[error("point ({:.3}, {:.3}, {:.3}) is outside of the grid", .point.x, .point.y, .point.z)]
    OutOfBounds {
        /// The offending grid-frame point
        point: Vector3<f64>,
    },
}

impl FusionError {
    /// True for failures that are routine at the map border.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, FusionError::OutOfBounds { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FusionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = FusionError::OutOfBounds {
            point: Vector3::new(1.0, -2.5, 0.125),
        };
        assert_eq!(
            err.to_string(),
            "point (1.000, -2.500, 0.125) is outside of the grid"
        );
        assert!(err.is_out_of_bounds());

        let err: FusionError = GeometryError::InconsistentGrid(VoxelIndex::new(1, 2, 3)).into();
        assert_eq!(
            err.to_string(),
            "geometry error: grid has no cell center for validated index (1, 2, 3)"
        );
        assert!(!err.is_out_of_bounds());
    }
}
