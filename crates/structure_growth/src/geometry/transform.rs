//! Rotation and adjacency transforms.
use glam::{DVec3, IVec3};

use super::{BlockBox, Rotation};

/// Rotates `point` by `rotation` quarter turns about the vertical axis through `pivot`.
///
/// The vertical coordinate is left untouched. Rotation 0 returns `point` as is.
/// A half-integral pivot can land a point between voxels; such coordinates are
/// rounded half to even.
pub fn rotate_point_around_origin(pivot: DVec3, point: IVec3, rotation: Rotation) -> IVec3 {
    if rotation == Rotation::NORTH {
        return point;
    }

    let dx = point.x as f64 - pivot.x;
    let dz = point.z as f64 - pivot.z;
    let (rx, rz) = match rotation.index() {
        1 => (-dz, dx),
        2 => (-dx, -dz),
        _ => (dz, -dx),
    };

    IVec3::new(
        (pivot.x + rx).round_ties_even() as i32,
        point.y,
        (pivot.z + rz).round_ties_even() as i32,
    )
}

/// Origin for `next` so that it sits flush against `current` on the `facing` side.
///
/// The result is centered on the cross axis (floored for odd differences) and keeps
/// `next`'s own vertical position.
pub fn get_next_position(facing: Rotation, current: &BlockBox, next: &BlockBox) -> IVec3 {
    let center_x = current.min.x + (current.size.x - next.size.x).div_euclid(2);
    let center_z = current.min.z + (current.size.z - next.size.z).div_euclid(2);
    match facing.index() {
        0 => IVec3::new(current.min.x + current.size.x, next.min.y, center_z),
        1 => IVec3::new(center_x, next.min.y, current.min.z + current.size.z),
        2 => IVec3::new(current.min.x - next.size.x, next.min.y, center_z),
        _ => IVec3::new(center_x, next.min.y, current.min.z - next.size.z),
    }
}
