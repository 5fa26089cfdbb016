//! Integer voxel geometry shared by structures, nodes and grids.
//!
//! - [`Rotation`]: quarter turns about the vertical axis.
//! - [`BlockBox`]: an axis-aligned voxel box (inclusive origin, exclusive far corner).
//! - [`transform`]: point rotation and adjacency helpers.
//! - [`grid`]: world-anchored 2D grids used for height maps and occupancy.
use glam::IVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod grid;
pub mod transform;

pub use grid::{BuildArea, Grid2, HeightMap, OccupancyGrid};
pub use transform::{get_next_position, rotate_point_around_origin};

/// Names of the block-property compass cycle, indexed by rotation.
pub const COMPASS: [&str; 4] = ["north", "east", "south", "west"];

/// A multiple of 90° about the vertical axis, always in `0..4`.
///
/// Index 1 turns +X onto +Z. As an attachment facing, 0 adjoins on the +X side,
/// 1 on +Z, 2 on -X and 3 on -Z.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rotation(u8);

impl Rotation {
    pub const NORTH: Rotation = Rotation(0);
    pub const EAST: Rotation = Rotation(1);
    pub const SOUTH: Rotation = Rotation(2);
    pub const WEST: Rotation = Rotation(3);

    pub const ALL: [Rotation; 4] = [Self::NORTH, Self::EAST, Self::SOUTH, Self::WEST];

    /// Returns `None` when `index` is not in `0..4`.
    pub const fn new(index: u8) -> Option<Self> {
        if index < 4 {
            Some(Rotation(index))
        } else {
            None
        }
    }

    /// Wraps any integer into `0..4`.
    pub fn wrapping(index: i64) -> Self {
        Rotation(index.rem_euclid(4) as u8)
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Composes two rotations.
    #[inline]
    pub const fn then(self, other: Rotation) -> Rotation {
        Rotation((self.0 + other.0) % 4)
    }

    /// The rotation that undoes this one.
    #[inline]
    pub const fn inverse(self) -> Rotation {
        Rotation((4 - self.0) % 4)
    }

    /// The facing pointing the other way.
    #[inline]
    pub const fn opposite(self) -> Rotation {
        Rotation((self.0 + 2) % 4)
    }

    /// Odd rotations swap the X and Z axes.
    #[inline]
    pub const fn swaps_axes(self) -> bool {
        self.0 % 2 == 1
    }

    pub fn compass_name(self) -> &'static str {
        COMPASS[self.0 as usize]
    }

    pub fn from_compass(name: &str) -> Option<Self> {
        COMPASS
            .iter()
            .position(|c| *c == name)
            .map(|i| Rotation(i as u8))
    }
}

impl TryFrom<u8> for Rotation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rotation::new(value).ok_or_else(|| format!("rotation {value} is outside 0..=3"))
    }
}

impl From<Rotation> for u8 {
    fn from(value: Rotation) -> Self {
        value.0
    }
}

/// Axis-aligned voxel box with an inclusive `min` corner and a `size` in voxels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockBox {
    pub min: IVec3,
    pub size: IVec3,
}

impl BlockBox {
    pub fn new(min: IVec3, size: IVec3) -> Self {
        Self { min, size }
    }

    /// Exclusive far corner.
    #[inline]
    pub fn max(&self) -> IVec3 {
        self.min + self.size
    }

    /// Number of columns covered in the horizontal plane.
    pub fn horizontal_area(&self) -> i64 {
        self.size.x.max(0) as i64 * self.size.z.max(0) as i64
    }

    /// Whether the horizontal footprints of two boxes share any column.
    pub fn overlaps_horizontally(&self, other: &BlockBox) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && other.min.x < a_max.x && self.min.z < b_max.z && other.min.z < a_max.z
    }
}
