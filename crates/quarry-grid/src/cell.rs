use quarry_geom::{Aabb, Vec3};
use serde::{Deserialize, Serialize};

/// Integer-indexed cube address. Cell `i` on an axis spans the interval
/// of width `grid_size` centered on `i * grid_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCell {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Maps a world point to its cell by rounding each axis of
    /// `point / grid_size` half away from zero. Every caller on either
    /// side of the wire goes through this one function; place/remove
    /// targeting depends on client and server resolving the same cell
    /// for the same point.
    #[inline]
    pub fn from_world(point: Vec3, grid_size: f32) -> Self {
        debug_assert!(grid_size > 0.0);
        Self {
            x: (point.x / grid_size).round() as i32,
            y: (point.y / grid_size).round() as i32,
            z: (point.z / grid_size).round() as i32,
        }
    }

    /// World-space center of the cell cube.
    #[inline]
    pub fn center(self, grid_size: f32) -> Vec3 {
        Vec3::new(
            self.x as f32 * grid_size,
            self.y as f32 * grid_size,
            self.z as f32 * grid_size,
        )
    }

    /// World-space bounds of the cell cube.
    #[inline]
    pub fn aabb(self, grid_size: f32) -> Aabb {
        Aabb::from_center_half_extents(self.center(grid_size), Vec3::splat(grid_size * 0.5))
    }

    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}
