//! Integer voxel and column addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer address of a single voxel.
///
/// Validity is decided by the grid that produced it, not by the type:
/// an index may point outside the storage extent when it was resolved
/// without bounds checking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelIndex {
    /// X index
    pub x: i32,
    /// Y index
    pub y: i32,
    /// Z index (vertical)
    pub z: i32,
}

impl VoxelIndex {
    /// Create a new voxel index.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The (x, y) column this voxel belongs to.
    #[inline]
    pub const fn column(&self) -> ColumnIndex {
        ColumnIndex::new(self.x, self.y)
    }

    /// Component by axis number (0 = x, 1 = y, 2 = z).
    #[inline]
    pub(crate) fn axis(&self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    #[inline]
    pub(crate) fn axis_mut(&mut self, axis: usize) -> &mut i32 {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }

    /// Number of face-adjacent steps between two indices.
    pub fn manhattan_distance(&self, other: &VoxelIndex) -> u64 {
        u64::from(self.x.abs_diff(other.x))
            + u64::from(self.y.abs_diff(other.y))
            + u64::from(self.z.abs_diff(other.z))
    }
}

impl fmt::Display for VoxelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Integer address of a vertical (x, y) column of voxels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnIndex {
    /// X index
    pub x: i32,
    /// Y index
    pub y: i32,
}

impl ColumnIndex {
    /// Create a new column index.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Voxel in this column at vertical index `z`.
    #[inline]
    pub const fn with_z(&self, z: i32) -> VoxelIndex {
        VoxelIndex::new(self.x, self.y, z)
    }
}

impl fmt::Display for ColumnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
