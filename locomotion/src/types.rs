/*!
Core math aliases and small data types shared by the locomotion submodules.

This module intentionally contains no algorithms. It defines the data exchanged between:
- the ground probe (surface hits, capsule dimensions)
- the velocity integrator and state machine (planar/vertical velocity)
- the physics-backed collaborators (`rapier_world`, `kinematic`)

Conventions
- +Y is world up. Character forward is local +Z, right is local +X.
- A yaw rotation by a positive angle turns +Z toward +X (clockwise seen from above).
- Units are meters and seconds. Angles stored in settings are degrees.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Capsule dimensions of the character body.
///
/// half_height is the half-length of the cylinder section (aligned with +Y),
/// so the total capsule height is 2*half_height + 2*radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Offset from the capsule center down to the bottom of the capsule.
    #[inline]
    pub fn center_to_feet(&self) -> f32 {
        self.half_height + self.radius
    }

    /// World position of the capsule's lowest point given its center.
    #[inline]
    pub fn feet(&self, center: Vec3) -> Vec3 {
        Vec3::new(center.x, center.y - self.center_to_feet(), center.z)
    }
}

/// A single surface contact returned by a swept shape query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// World-space surface normal, oriented to oppose the cast direction.
    pub normal: Vec3,
    /// Fraction (0..1) of the tested translation where the hit occurred.
    pub fraction: f32,
}

/// Collision layer bitmask.
///
/// Colliders carry a set of layers; queries carry a mask and only consider colliders
/// whose layers intersect it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);
    /// Layer conventionally used for walkable world geometry.
    pub const GROUND: Self = Self(1);

    #[inline]
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::GROUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capsule_feet_sit_below_center() {
        let capsule = CapsuleSpec {
            radius: 0.3,
            half_height: 0.6,
        };
        let feet = capsule.feet(Vec3::new(1.0, 2.0, 3.0));
        assert!((feet.y - 1.1).abs() < 1.0e-6);
        assert_eq!((feet.x, feet.z), (1.0, 3.0));
    }

    #[test]
    fn layer_masks_intersect_on_shared_bits() {
        assert!(LayerMask::GROUND.intersects(LayerMask::ALL));
        assert!(!LayerMask::GROUND.intersects(LayerMask(0b10)));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
    }
}
