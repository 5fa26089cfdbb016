//! World-anchored 2D grids.
//!
//! This module defines [`Grid2`], a dense grid over horizontal (X, Z) world columns whose
//! cell `(0, 0)` sits at a fixed world position, and the [`BuildArea`] that all grids of a
//! run share. Height maps ([`HeightMap`]) and the occupancy map ([`OccupancyGrid`]) are
//! both `Grid2`s, so cropping a footprint out of either works the same way.
//!
//! Cropping clamps to the source grid. A crop that fell partially or fully outside the
//! source comes back smaller than requested, which callers treat as out of bounds.
use glam::{IVec2, IVec3};

use crate::error::{Error, Result};

/// Grid of terrain heights (first free Y above the ground) per column.
pub type HeightMap = Grid2<i32>;

/// Grid of claimed columns; any non-zero cell is occupied.
pub type OccupancyGrid = Grid2<u8>;

/// Horizontal projection of a voxel position.
#[inline]
pub fn horizontal(v: IVec3) -> IVec2 {
    IVec2::new(v.x, v.z)
}

/// Maps a world-space rectangle into local indices of a grid anchored at `grid_origin`.
///
/// Returns `(local_origin, local_far_corner)`; the far corner is exclusive.
pub fn get_crop(grid_origin: IVec2, crop_origin: IVec2, crop_far_corner: IVec2) -> (IVec2, IVec2) {
    (crop_origin - grid_origin, crop_far_corner - grid_origin)
}

/// The tracked horizontal region of the world: origin column and size along X and Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildArea {
    pub origin: IVec2,
    pub size: IVec2,
}

impl BuildArea {
    pub fn new(x: i32, z: i32, size_x: i32, size_z: i32) -> Self {
        Self {
            origin: IVec2::new(x, z),
            size: IVec2::new(size_x, size_z),
        }
    }

    /// Exclusive far corner.
    pub fn far_corner(&self) -> IVec2 {
        self.origin + self.size
    }

    pub fn contains(&self, column: IVec2) -> bool {
        let far = self.far_corner();
        column.x >= self.origin.x && column.y >= self.origin.y && column.x < far.x && column.y < far.y
    }

    pub fn validate(&self) -> Result<()> {
        if self.size.x <= 0 || self.size.y <= 0 {
            return Err(Error::InvalidConfig(
                "build area must be > 0 in both horizontal directions".into(),
            ));
        }
        Ok(())
    }

    /// A zero-filled grid covering exactly this area.
    pub fn grid<T: Clone + Default>(&self) -> Grid2<T> {
        Grid2::filled(
            self.origin,
            self.size.x.max(0) as usize,
            self.size.y.max(0) as usize,
            T::default(),
        )
    }
}

/// Dense grid over world columns. `origin` is the world column of cell `(0, 0)`.
///
/// Cells are stored row by row along X: index `iz * width + ix`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2<T> {
    pub origin: IVec2,
    pub width: usize,
    pub depth: usize,
    pub data: Vec<T>,
}

impl<T> Grid2<T> {
    /// Builds a grid by evaluating `f` at every world column.
    pub fn from_fn(origin: IVec2, width: usize, depth: usize, mut f: impl FnMut(IVec2) -> T) -> Self {
        let mut data = Vec::with_capacity(width * depth);
        for iz in 0..depth {
            for ix in 0..width {
                data.push(f(origin + IVec2::new(ix as i32, iz as i32)));
            }
        }
        Self {
            origin,
            width,
            depth,
            data,
        }
    }

    pub fn from_vec(origin: IVec2, width: usize, depth: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * depth {
            return Err(Error::InvalidConfig(format!(
                "grid of {width}x{depth} needs {} cells, got {}",
                width * depth,
                data.len()
            )));
        }
        Ok(Self {
            origin,
            width,
            depth,
            data,
        })
    }

    /// Size as `(width, depth)`, i.e. extent along X and along Z.
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Exclusive far corner in world columns.
    pub fn far_corner(&self) -> IVec2 {
        self.origin + IVec2::new(self.width as i32, self.depth as i32)
    }

    #[inline]
    fn index(&self, ix: isize, iz: isize) -> Option<usize> {
        if ix < 0 || iz < 0 || ix as usize >= self.width || iz as usize >= self.depth {
            return None;
        }
        Some(iz as usize * self.width + ix as usize)
    }

    /// Cell at local indices.
    pub fn get(&self, ix: isize, iz: isize) -> Option<&T> {
        self.index(ix, iz).map(|i| &self.data[i])
    }

    /// Cell at a world column.
    pub fn get_world(&self, column: IVec2) -> Option<&T> {
        let local = column - self.origin;
        self.get(local.x as isize, local.y as isize)
    }

    /// Overwrites the cell at a world column; returns `false` when outside the grid.
    pub fn set_world(&mut self, column: IVec2, value: T) -> bool {
        let local = column - self.origin;
        match self.index(local.x as isize, local.y as isize) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Whether the world rectangle `[crop_origin, crop_far_corner)` lies fully inside.
    pub fn covers(&self, crop_origin: IVec2, crop_far_corner: IVec2) -> bool {
        let far = self.far_corner();
        crop_origin.x >= self.origin.x
            && crop_origin.y >= self.origin.y
            && crop_far_corner.x <= far.x
            && crop_far_corner.y <= far.y
            && crop_origin.x <= crop_far_corner.x
            && crop_origin.y <= crop_far_corner.y
    }

    /// Clamps a world rectangle to local index ranges `(x0, x1, z0, z1)`.
    fn clamped_range(&self, crop_origin: IVec2, crop_far_corner: IVec2) -> (usize, usize, usize, usize) {
        let (lo, hi) = get_crop(self.origin, crop_origin, crop_far_corner);
        let clamp = |v: i32, len: usize| v.clamp(0, len as i32) as usize;
        let x0 = clamp(lo.x, self.width);
        let x1 = clamp(hi.x, self.width).max(x0);
        let z0 = clamp(lo.y, self.depth);
        let z1 = clamp(hi.y, self.depth).max(z0);
        (x0, x1, z0, z1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T: Clone> Grid2<T> {
    pub fn filled(origin: IVec2, width: usize, depth: usize, value: T) -> Self {
        Self {
            origin,
            width,
            depth,
            data: vec![value; width * depth],
        }
    }

    /// Copies the world rectangle `[crop_origin, crop_far_corner)` out of this grid.
    ///
    /// The copy keeps world anchoring: its `origin` is the first column actually copied.
    /// Parts of the rectangle outside this grid are dropped, so compare
    /// [`Grid2::size`] with the requested size to detect an out-of-bounds crop.
    pub fn crop(&self, crop_origin: IVec2, crop_far_corner: IVec2) -> Grid2<T> {
        let (x0, x1, z0, z1) = self.clamped_range(crop_origin, crop_far_corner);
        let mut data = Vec::with_capacity((x1 - x0) * (z1 - z0));
        for iz in z0..z1 {
            let row = iz * self.width;
            data.extend_from_slice(&self.data[row + x0..row + x1]);
        }
        Grid2 {
            origin: self.origin + IVec2::new(x0 as i32, z0 as i32),
            width: x1 - x0,
            depth: z1 - z0,
            data,
        }
    }

    /// Sets every cell of the world rectangle that lies inside the grid.
    pub fn fill_rect(&mut self, crop_origin: IVec2, crop_far_corner: IVec2, value: T) {
        let (x0, x1, z0, z1) = self.clamped_range(crop_origin, crop_far_corner);
        for iz in z0..z1 {
            let row = iz * self.width;
            for cell in &mut self.data[row + x0..row + x1] {
                *cell = value.clone();
            }
        }
    }
}

impl Grid2<i32> {
    /// Highest cell, `None` for an empty grid.
    pub fn max_height(&self) -> Option<i32> {
        self.data.iter().copied().max()
    }

    /// Arithmetic mean, `None` for an empty grid.
    pub fn mean_height(&self) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        let sum: i64 = self.data.iter().map(|h| *h as i64).sum();
        Some(sum as f64 / self.data.len() as f64)
    }

    /// Most common height; ties resolve to the lowest height.
    pub fn most_frequent_height(&self) -> Option<i32> {
        let mut sorted = self.data.clone();
        sorted.sort_unstable();
        let mut best: Option<(i32, usize)> = None;
        for run in sorted.chunk_by(|a, b| a == b) {
            if best.is_none_or(|(_, n)| run.len() > n) {
                best = Some((run[0], run.len()));
            }
        }
        best.map(|(h, _)| h)
    }
}

impl Grid2<u8> {
    pub fn any_occupied(&self) -> bool {
        self.data.iter().any(|c| *c > 0)
    }

    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|c| **c > 0).count()
    }

    /// Claims every column of the world rectangle that lies inside the grid.
    pub fn mark_occupied(&mut self, crop_origin: IVec2, crop_far_corner: IVec2) {
        self.fill_rect(crop_origin, crop_far_corner, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> HeightMap {
        // 4 wide, 3 deep, anchored at (10, -5); value = x + 10 * z (local).
        Grid2::from_fn(IVec2::new(10, -5), 4, 3, |c| (c.x - 10) + 10 * (c.y + 5))
    }

    #[test]
    fn world_lookup_uses_anchor() {
        let g = ramp();
        assert_eq!(g.get_world(IVec2::new(10, -5)), Some(&0));
        assert_eq!(g.get_world(IVec2::new(13, -3)), Some(&23));
        assert_eq!(g.get_world(IVec2::new(14, -3)), None);
        assert_eq!(g.get_world(IVec2::new(9, -5)), None);
    }

    #[test]
    fn inside_crop_keeps_requested_shape_and_anchor() {
        let g = ramp();
        let c = g.crop(IVec2::new(11, -4), IVec2::new(13, -2));
        assert_eq!(c.size(), (2, 2));
        assert_eq!(c.origin, IVec2::new(11, -4));
        assert_eq!(c.data, vec![11, 12, 21, 22]);
        assert!(g.covers(IVec2::new(11, -4), IVec2::new(13, -2)));
    }

    #[test]
    fn crop_partially_outside_shrinks() {
        let g = ramp();
        let c = g.crop(IVec2::new(12, -6), IVec2::new(16, -4));
        assert_eq!(c.size(), (2, 1));
        assert!(!g.covers(IVec2::new(12, -6), IVec2::new(16, -4)));
    }

    #[test]
    fn crop_fully_outside_is_empty() {
        let g = ramp();
        let c = g.crop(IVec2::new(100, 100), IVec2::new(104, 104));
        assert!(c.is_empty());
        assert_eq!(c.size(), (0, 0));
        assert_eq!(c.max_height(), None);
        assert_eq!(c.mean_height(), None);
    }

    #[test]
    fn height_statistics() {
        let g = Grid2::from_vec(IVec2::ZERO, 3, 2, vec![64, 65, 64, 70, 64, 65]).unwrap();
        assert_eq!(g.max_height(), Some(70));
        assert_eq!(g.most_frequent_height(), Some(64));
        let mean = g.mean_height().unwrap();
        assert!((mean - 392.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(Grid2::from_vec(IVec2::ZERO, 3, 3, vec![0u8; 8]).is_err());
    }

    #[test]
    fn marking_occupancy_only_touches_the_rectangle() {
        let area = BuildArea::new(0, 0, 10, 10);
        let mut occupancy: OccupancyGrid = area.grid();
        occupancy.mark_occupied(IVec2::new(2, 3), IVec2::new(6, 7));
        assert_eq!(occupancy.occupied_count(), 16);
        assert!(occupancy.crop(IVec2::new(2, 3), IVec2::new(6, 7)).iter().all(|c| *c == 1));
        assert!(!occupancy.crop(IVec2::new(6, 0), IVec2::new(10, 10)).any_occupied());
    }

    #[test]
    fn build_area_bounds() {
        let area = BuildArea::new(-8, 4, 16, 16);
        assert!(area.contains(IVec2::new(-8, 4)));
        assert!(area.contains(IVec2::new(7, 19)));
        assert!(!area.contains(IVec2::new(8, 4)));
        assert!(area.validate().is_ok());
        assert!(BuildArea::new(0, 0, 0, 5).validate().is_err());
    }
}
