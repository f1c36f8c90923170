//! Voxel traversal along a ray, grouped by column.
//!
//! Walks every voxel a line segment passes through (Amanatides & Woo
//! digital differential analyzer) and groups consecutive voxels of the same
//! (x, y) column into one [`RayElement`]:
//!
//! ```text
//!   z                               elements:
//!   ▲          ┌──┐                  (2,0) z 3..=4
//!   │       ┌──┤■■│ ← end            (1,0) z 1..=3
//!   │    ┌──┤■■└──┘                  (0,0) z 0..=1
//!   │ ┌──┤■■└──┘
//!   │ │■■└──┘
//!   │ └──┘ ← start
//!   └──────────────▶ x
//! ```
//!
//! ## Index consistency
//!
//! The walk is driven by the integer distance between the start and end
//! indices rather than by the continuous parameter alone: exactly
//! `|Δx| + |Δy| + |Δz|` unit steps are taken, and an axis that has no
//! steps left is never advanced. The last voxel visited is therefore always
//! the end index, even when floating point error would otherwise overshoot
//! or stop one cell short.
//!
//! Runs of z steps inside one column are taken in a single jump, so the
//! cost of a walk grows with the number of columns it crosses, not with
//! its vertical length.

use nalgebra::Vector3;

use crate::core::{ColumnIndex, VoxelIndex};

/// One traversed column and the contiguous run of cells visited in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayElement {
    /// Column index
    pub column: ColumnIndex,
    /// First z index visited in this column
    pub z_first: i32,
    /// Last z index visited in this column (inclusive)
    pub z_last: i32,
    /// +1 or -1, direction of travel along z
    pub z_step: i32,
}

impl RayElement {
    /// Number of cells in this element.
    #[inline]
    pub fn len(&self) -> usize {
        self.z_last.abs_diff(self.z_first) as usize + 1
    }

    /// Always false: an element holds at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the z indices of this element in traversal order.
    pub fn z_indices(&self) -> impl Iterator<Item = i32> + use<> {
        let first = self.z_first;
        let step = self.z_step;
        (0..self.len() as i64).map(move |i| (i64::from(first) + i * i64::from(step)) as i32)
    }

    /// Iterate the voxel indices of this element in traversal order.
    pub fn indices(&self) -> impl Iterator<Item = VoxelIndex> + use<> {
        let column = self.column;
        self.z_indices().map(move |z| column.with_z(z))
    }

    /// True if the element visits level `z`.
    #[inline]
    pub fn contains_level(&self, z: i32) -> bool {
        z >= self.z_first.min(self.z_last) && z <= self.z_first.max(self.z_last)
    }

    /// The part of this element with z in `lo..=hi`, in the same direction.
    pub fn clip_levels(&self, lo: i32, hi: i32) -> Option<RayElement> {
        let bottom = self.z_first.min(self.z_last).max(lo);
        let top = self.z_first.max(self.z_last).min(hi);
        if bottom > top {
            return None;
        }
        let (z_first, z_last) = if self.z_step > 0 {
            (bottom, top)
        } else {
            (top, bottom)
        };
        Some(RayElement {
            z_first,
            z_last,
            ..*self
        })
    }
}

/// Iterator over the columns a segment passes through.
pub struct RayTraversal {
    current: VoxelIndex,
    step: [i32; 3],
    remaining: [u64; 3],
    t_max: [f64; 3],
    t_delta: [f64; 3],
    done: bool,
}

impl RayTraversal {
    /// Create a traversal from `start` to `end`.
    ///
    /// # Arguments
    /// * `resolution` - Per-axis voxel size
    /// * `start` - Segment start (grid frame)
    /// * `start_idx` - Index of the voxel containing `start`
    /// * `start_center` - Grid-frame center of `start_idx`
    /// * `end` - Segment end (grid frame)
    /// * `end_idx` - Index of the voxel containing `end`
    pub fn new(
        resolution: &Vector3<f64>,
        start: &Vector3<f64>,
        start_idx: VoxelIndex,
        start_center: &Vector3<f64>,
        end: &Vector3<f64>,
        end_idx: VoxelIndex,
    ) -> Self {
        let delta = end - start;

        let mut step = [0; 3];
        let mut remaining = [0; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];

        for axis in 0..3 {
            let from = start_idx.axis(axis);
            let to = end_idx.axis(axis);
            remaining[axis] = u64::from(from.abs_diff(to));
            step[axis] = if to >= from { 1 } else { -1 };

            // Parameter t runs from 0 at start to 1 at end
            if remaining[axis] > 0 && delta[axis] != 0.0 {
                let boundary =
                    start_center[axis] + step[axis] as f64 * resolution[axis] * 0.5;
                t_max[axis] = ((boundary - start[axis]) / delta[axis]).max(0.0);
                t_delta[axis] = resolution[axis] / delta[axis].abs();
            }
        }

        Self {
            current: start_idx,
            step,
            remaining,
            t_max,
            t_delta,
            done: false,
        }
    }

    /// Axis to advance next: the pending axis whose boundary is crossed first.
    fn next_axis(&self) -> Option<usize> {
        (0..3)
            .filter(|&axis| self.remaining[axis] > 0)
            .min_by(|&a, &b| self.t_max[a].total_cmp(&self.t_max[b]))
    }

    /// Number of z steps taken before the next x or y boundary.
    ///
    /// Only called when z is the next axis. Ties go to x and y, matching
    /// `next_axis`.
    fn z_run(&self) -> u64 {
        let horizontal = (0..2)
            .filter(|&axis| self.remaining[axis] > 0)
            .map(|axis| self.t_max[axis])
            .fold(f64::INFINITY, f64::min);
        if !horizontal.is_finite() {
            return self.remaining[2];
        }
        let steps = ((horizontal - self.t_max[2]) / self.t_delta[2]).ceil();
        if steps.is_finite() && steps >= 1.0 {
            (steps as u64).min(self.remaining[2])
        } else {
            1
        }
    }

    fn advance(&mut self, axis: usize, steps: u64) {
        // Widened: a single jump may span more than i32::MAX levels
        let value = self.current.axis_mut(axis);
        *value = (i64::from(*value) + i64::from(self.step[axis]) * steps as i64) as i32;
        self.remaining[axis] -= steps;
        self.t_max[axis] += self.t_delta[axis] * steps as f64;
    }
}

impl Iterator for RayTraversal {
    type Item = RayElement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut element = RayElement {
            column: self.current.column(),
            z_first: self.current.z,
            z_last: self.current.z,
            z_step: self.step[2],
        };

        loop {
            match self.next_axis() {
                None => {
                    self.done = true;
                    return Some(element);
                }
                Some(2) => {
                    let steps = self.z_run();
                    self.advance(2, steps);
                    element.z_last = self.current.z;
                }
                Some(axis) => {
                    // Leaving the column: current now starts the next element
                    self.advance(axis, 1);
                    return Some(element);
                }
            }
        }
    }
}

/// Collect all elements along a segment.
///
/// Always returns at least the element holding `start_idx`.
pub fn compute_ray(
    resolution: &Vector3<f64>,
    start: &Vector3<f64>,
    start_idx: VoxelIndex,
    start_center: &Vector3<f64>,
    end: &Vector3<f64>,
    end_idx: VoxelIndex,
) -> Vec<RayElement> {
    RayTraversal::new(resolution, start, start_idx, start_center, end, end_idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::mapper::VoxelGrid;
    use crate::grid::traits::{Bounds, VoxelMapper};
    use nalgebra::Vector2;

    fn grid() -> VoxelGrid {
        VoxelGrid::new(
            Vector3::repeat(0.1),
            Vector2::new(100, 100),
            Vector3::new(-5.05, -5.05, -0.05),
        )
    }

    fn ray(grid: &VoxelGrid, start: Vector3<f64>, end: Vector3<f64>) -> Vec<RayElement> {
        let start_idx = grid.to_index(&start, Bounds::Checked).unwrap();
        let end_idx = grid.to_index(&end, Bounds::Unchecked).unwrap();
        let center = grid.from_index(start_idx).unwrap();
        compute_ray(&grid.resolution(), &start, start_idx, &center, &end, end_idx)
    }

    fn voxels(elements: &[RayElement]) -> Vec<VoxelIndex> {
        elements.iter().flat_map(|e| e.indices()).collect()
    }

    #[test]
    fn test_along_x() {
        let g = grid();
        let elements = ray(&g, Vector3::zeros(), Vector3::new(0.5, 0.0, 0.0));

        assert_eq!(elements.len(), 6);
        for (i, element) in elements.iter().enumerate() {
            assert_eq!(element.column, ColumnIndex::new(50 + i as i32, 50));
            assert_eq!(element.z_first, 0);
            assert_eq!(element.z_last, 0);
        }
    }

    #[test]
    fn test_negative_direction() {
        let g = grid();
        let elements = ray(&g, Vector3::zeros(), Vector3::new(0.0, -0.3, 0.0));

        let columns: Vec<ColumnIndex> = elements.iter().map(|e| e.column).collect();
        assert_eq!(
            columns,
            vec![
                ColumnIndex::new(50, 50),
                ColumnIndex::new(50, 49),
                ColumnIndex::new(50, 48),
                ColumnIndex::new(50, 47),
            ]
        );
    }

    #[test]
    fn test_vertical_ray_is_single_element() {
        let g = grid();
        let elements = ray(&g, Vector3::zeros(), Vector3::new(0.0, 0.0, -0.4));

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].z_first, 0);
        assert_eq!(elements[0].z_last, -4);
        assert_eq!(elements[0].z_step, -1);
        assert_eq!(elements[0].len(), 5);

        let z: Vec<i32> = elements[0].z_indices().collect();
        assert_eq!(z, vec![0, -1, -2, -3, -4]);
    }

    #[test]
    fn test_long_vertical_ray_in_one_jump() {
        let g = grid();
        let elements = ray(&g, Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0e6));

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].z_first, 0);
        assert_eq!(elements[0].z_last, 10_000_000);
        assert_eq!(elements[0].len(), 10_000_001);
    }

    #[test]
    fn test_steep_ray_covers_every_level() {
        let g = grid();
        let start = Vector3::new(0.0, 0.0, 0.0);
        let end = Vector3::new(0.26, 0.0, 1.0e4);
        let elements = ray(&g, start, end);

        let start_idx = g.to_index(&start, Bounds::Checked).unwrap();
        let end_idx = g.to_index(&end, Bounds::Checked).unwrap();
        assert_eq!(elements.len(), 4);

        let total: u64 = elements.iter().map(|e| e.len() as u64).sum();
        assert_eq!(total, start_idx.manhattan_distance(&end_idx) + 1);

        // Columns hand over at the level they were left on
        for pair in elements.windows(2) {
            assert_eq!(pair[1].z_first, pair[0].z_last);
        }
        assert_eq!(elements[3].column.with_z(elements[3].z_last), end_idx);
    }

    #[test]
    fn test_clip_levels() {
        let down = RayElement {
            column: ColumnIndex::new(3, 4),
            z_first: 3,
            z_last: -4,
            z_step: -1,
        };
        let clipped = down.clip_levels(-2, 10).unwrap();
        assert_eq!((clipped.z_first, clipped.z_last, clipped.z_step), (3, -2, -1));
        assert_eq!(clipped.column, down.column);
        assert!(down.clip_levels(5, 10).is_none());

        let up = RayElement {
            z_first: 0,
            z_last: 9,
            z_step: 1,
            ..down
        };
        let clipped = up.clip_levels(2, 4).unwrap();
        assert_eq!(clipped.z_indices().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(up.contains_level(9));
        assert!(!up.contains_level(10));
    }

    #[test]
    fn test_same_cell() {
        let g = grid();
        let elements = ray(&g, Vector3::zeros(), Vector3::new(0.01, 0.02, 0.0));
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].len(), 1);
    }

    #[test]
    fn test_diagonal_visits_face_adjacent_cells() {
        let g = grid();
        let start = Vector3::new(0.013, -0.021, 0.002);
        let end = Vector3::new(0.734, 0.418, 0.377);
        let elements = ray(&g, start, end);
        let cells = voxels(&elements);

        let start_idx = g.to_index(&start, Bounds::Checked).unwrap();
        let end_idx = g.to_index(&end, Bounds::Checked).unwrap();
        assert_eq!(cells.first(), Some(&start_idx));
        assert_eq!(cells.last(), Some(&end_idx));
        assert_eq!(
            cells.len() as u64,
            start_idx.manhattan_distance(&end_idx) + 1
        );

        for pair in cells.windows(2) {
            assert_eq!(pair[0].manhattan_distance(&pair[1]), 1);
        }
    }

    #[test]
    fn test_each_column_visited_once() {
        let g = grid();
        let elements = ray(
            &g,
            Vector3::new(-1.23, 0.71, 0.4),
            Vector3::new(2.9, -1.44, -0.61),
        );

        let mut columns: Vec<ColumnIndex> = elements.iter().map(|e| e.column).collect();
        let total = columns.len();
        columns.sort();
        columns.dedup();
        assert_eq!(columns.len(), total);

        // z always moves downward on this ray
        for element in &elements {
            assert_eq!(element.z_step, -1);
            assert!(element.z_last <= element.z_first);
        }
    }

    #[test]
    fn test_cells_lie_on_segment() {
        let g = grid();
        let start = Vector3::new(0.31, -0.27, 0.12);
        let end = Vector3::new(-0.88, 0.64, 0.93);
        let cells = voxels(&ray(&g, start, end));

        // Every visited voxel must be within half a diagonal of the segment
        let direction = (end - start).normalize();
        let length = (end - start).norm();
        let half_diagonal = (3.0f64).sqrt() * 0.05 + 1e-9;
        for idx in cells {
            let center = g.from_index(idx).unwrap();
            let t = (center - start).dot(&direction).clamp(0.0, length);
            let closest = start + direction * t;
            assert!((center - closest).norm() <= half_diagonal);
        }
    }

    #[test]
    fn test_leaves_grid_extent() {
        let g = grid();
        let elements = ray(&g, Vector3::new(4.8, 0.0, 0.0), Vector3::new(5.3, 0.0, 0.0));
        let last = elements.last().unwrap();
        assert!(!g.contains_column(last.column));
        assert!(g.contains_column(elements[0].column));
    }
}
