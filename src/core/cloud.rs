//! Range sensor point clouds.

use nalgebra::{Isometry3, Point3, Vector3};

/// A set of range measurements taken from a single sensor position.
///
/// Points and the sensor origin are expressed in the sensor frame, in
/// single precision as delivered by the driver. They are widened to
/// `f64` when transformed into the grid frame.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    /// Sensor position the measurements were taken from (sensor frame)
    pub sensor_origin: Vector3<f32>,
    /// Measured surface points (sensor frame)
    pub points: Vec<Vector3<f32>>,
}

impl PointCloud {
    /// Create a cloud from an origin and a list of points.
    pub fn new(sensor_origin: Vector3<f32>, points: Vec<Vector3<f32>>) -> Self {
        Self {
            sensor_origin,
            points,
        }
    }

    /// Create an empty cloud with pre-allocated capacity.
    pub fn with_capacity(sensor_origin: Vector3<f32>, capacity: usize) -> Self {
        Self {
            sensor_origin,
            points: Vec::with_capacity(capacity),
        }
    }

    /// Append a measurement.
    pub fn push(&mut self, point: Vector3<f32>) {
        self.points.push(point);
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the cloud holds no measurements.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sensor origin mapped through `transform`.
    pub fn origin_in(&self, transform: &Isometry3<f64>) -> Vector3<f64> {
        (transform * Point3::from(self.sensor_origin.cast::<f64>())).coords
    }

    /// Iterate the measurements mapped through `transform`.
    pub fn points_in<'a>(
        &'a self,
        transform: &'a Isometry3<f64>,
    ) -> impl Iterator<Item = Vector3<f64>> + 'a {
        self.points
            .iter()
            .map(move |p| (transform * Point3::from(p.cast::<f64>())).coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn test_cloud_basics() {
        let mut cloud = PointCloud::with_capacity(Vector3::zeros(), 4);
        assert!(cloud.is_empty());

        cloud.push(Vector3::new(1.0, 0.0, 0.0));
        cloud.push(Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn test_origin_is_translated() {
        let cloud = PointCloud::new(Vector3::new(0.5, 0.0, 0.0), vec![]);
        let transform = Isometry3::translation(1.0, 2.0, 3.0);

        let origin = cloud.origin_in(&transform);
        assert_relative_eq!(origin, Vector3::new(1.5, 2.0, 3.0), epsilon = 1e-9);
    }

    #[test]
    fn test_points_are_rotated_and_translated() {
        let cloud = PointCloud::new(Vector3::zeros(), vec![Vector3::new(1.0, 0.0, 0.0)]);
        let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let transform = Isometry3::from_parts(Translation3::new(0.0, 0.0, 1.0), rotation);

        let points: Vec<_> = cloud.points_in(&transform).collect();
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0], Vector3::new(0.0, 1.0, 1.0), epsilon = 1e-9);
    }
}
