use nalgebra as na;

use crate::{
    constants::NORMALIZE_EPS_SQ,
    types::{Quat, Vec2, Vec3},
};

/// World up axis.
#[inline]
pub fn world_up() -> Vec3 {
    Vec3::y()
}

/// Drop the vertical component of a world vector.
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Planar (XZ) components of a world vector.
#[inline]
pub fn to_planar(v: &Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Planar (XZ) distance squared between two world positions (meters^2).
pub fn planar_distance_sq(a: Vec2, b: Vec2) -> f32 {
    let x = b.x - a.x;
    let z = b.y - a.y;
    x * x + z * z
}

/// Normalize `v`, returning zero for (near) zero-length input instead of NaN.
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq <= NORMALIZE_EPS_SQ {
        return Vec3::zeros();
    }
    v / len_sq.sqrt()
}

/// Scale `v` down so its length does not exceed `max_len`. Non-positive limits yield zero.
#[inline]
pub fn clamp_magnitude(v: Vec3, max_len: f32) -> Vec3 {
    if max_len <= 0.0 {
        return Vec3::zeros();
    }
    let len_sq = v.norm_squared();
    if len_sq > max_len * max_len {
        v * (max_len / len_sq.sqrt())
    } else {
        v
    }
}

/// Remove the component of `v` along `normal`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let n = normalize_or_zero(normal);
    v - n * v.dot(&n)
}

/// Unsigned angle between two vectors in degrees. Zero-length input yields 0.
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.norm_squared() * b.norm_squared()).sqrt();
    if denom <= NORMALIZE_EPS_SQ {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Signed angle from `from` to `to` around `axis`, in degrees.
///
/// The sign comes from the cross product tested against `axis`: positive means `to` lies
/// clockwise of `from` when looking down the axis.
pub fn signed_angle_deg(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let unsigned = angle_between_deg(from, to);
    let sign = if from.cross(&to).dot(&axis) < 0.0 {
        -1.0
    } else {
        1.0
    };
    sign * unsigned
}

/// Angle between a surface normal and world up, in degrees.
#[inline]
pub fn slope_angle_deg(normal: Vec3) -> f32 {
    angle_between_deg(normal, world_up())
}

/// Yaw-only rotation (about +Y) from an angle in degrees.
#[inline]
pub fn yaw_rotation(yaw_deg: f32) -> Quat {
    na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), yaw_deg.to_radians())
}

/// Yaw (degrees) that faces `dir_xz`, or `None` if the planar direction is degenerate.
pub fn yaw_from_xz(dir_xz: Vec2) -> Option<f32> {
    if dir_xz.norm_squared() <= NORMALIZE_EPS_SQ {
        return None;
    }
    Some(dir_xz.x.atan2(dir_xz.y).to_degrees())
}

/// Wrap an angle in degrees into `[-180, 180)`.
#[inline]
pub fn wrap_angle_deg(deg: f32) -> f32 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Yaw (degrees) of a rotation's forward axis, 0 when it points straight up or down.
pub fn yaw_of(rotation: &Quat) -> f32 {
    yaw_from_xz(to_planar(&forward(rotation))).unwrap_or(0.0)
}

/// Forward (+Z) direction of a rotation.
#[inline]
pub fn forward(rotation: &Quat) -> Vec3 {
    rotation * Vec3::z()
}

/// Right (+X) direction of a rotation.
#[inline]
pub fn right(rotation: &Quat) -> Vec3 {
    rotation * Vec3::x()
}
