//! Grounded classification and ground normal probing.
//!
//! Two modes give the classification hysteresis:
//! - while the character is in a grounded state, a tight overlap test at the base of the capsule
//!   keeps it grounded through small bumps;
//! - while airborne, a downward sphere sweep must find a walkable surface *and* the body must
//!   report contact before the character re-grounds.

use crate::{
    body::CharacterBody,
    types::{LayerMask, SurfaceHit, Vec3},
    utils::{normalize_or_zero, slope_angle_deg, world_up},
};

/// Shape queries against the static world. Triggers never count.
pub trait GroundSensor {
    /// Whether a sphere at `center` overlaps any collider in `mask`.
    fn check_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> bool;

    /// Sweep a sphere from `origin` along `translation`, returning the earliest hit in `mask`.
    /// The hit normal opposes the sweep.
    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        translation: Vec3,
        mask: LayerMask,
    ) -> Option<SurfaceHit>;
}

/// Per-character ground probe. Remembers the last surface normal it saw.
#[derive(Clone, Debug)]
pub struct GroundProbe {
    mask: LayerMask,
    probe_distance: f32,
    skin: f32,
    last_normal: Vec3,
}

impl GroundProbe {
    pub fn new(mask: LayerMask, probe_distance: f32, skin: f32) -> Self {
        Self {
            mask,
            probe_distance: probe_distance.max(0.0),
            skin: skin.max(0.0),
            last_normal: world_up(),
        }
    }

    /// Normal found by the most recent sweep, world up if nothing was hit.
    #[inline]
    pub fn ground_normal(&self) -> Vec3 {
        self.last_normal
    }

    pub fn reset(&mut self) {
        self.last_normal = world_up();
    }

    pub fn is_grounded(
        &mut self,
        currently_grounded: bool,
        body: &dyn CharacterBody,
        sensor: &dyn GroundSensor,
    ) -> bool {
        if currently_grounded {
            self.is_grounded_while_grounded(body, sensor)
        } else {
            self.is_grounded_while_airborne(body, sensor)
        }
    }

    fn is_grounded_while_grounded(&self, body: &dyn CharacterBody, sensor: &dyn GroundSensor) -> bool {
        let capsule = body.capsule();
        // Sphere sits just under the feet, its top touching the capsule's lowest point.
        let center = capsule.feet(body.position()) - world_up() * capsule.radius;
        sensor.check_sphere(center, capsule.radius, self.mask)
    }

    fn is_grounded_while_airborne(
        &mut self,
        body: &dyn CharacterBody,
        sensor: &dyn GroundSensor,
    ) -> bool {
        let normal = self.probe_normal(body, sensor);
        body.is_grounded() && slope_angle_deg(normal) <= body.slope_limit_deg()
    }

    /// Sweep down from the lower hemisphere and record the surface normal below the body.
    pub fn probe_normal(&mut self, body: &dyn CharacterBody, sensor: &dyn GroundSensor) -> Vec3 {
        let capsule = body.capsule();
        let origin = body.position() - world_up() * capsule.half_height;
        let translation = -world_up() * (self.skin + self.probe_distance);

        self.last_normal = sensor
            .cast_sphere(origin, capsule.radius, translation, self.mask)
            .map(|hit| normalize_or_zero(hit.normal))
            .filter(|n| *n != Vec3::zeros())
            .unwrap_or_else(world_up);
        self.last_normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{AnalyticBody, FlatGround};

    #[test]
    fn grounded_body_on_flat_ground_stays_grounded() {
        let ground = FlatGround::level(0.0);
        let body = AnalyticBody::standing_on(&ground);
        let mut probe = GroundProbe::new(LayerMask::GROUND, 0.3, 0.02);

        assert!(probe.is_grounded(true, &body, &ground));
    }

    #[test]
    fn tight_test_fails_high_above_ground() {
        let ground = FlatGround::level(0.0);
        let mut body = AnalyticBody::standing_on(&ground);
        body.teleport(body.position() + Vec3::new(0.0, 2.0, 0.0));
        let mut probe = GroundProbe::new(LayerMask::GROUND, 0.3, 0.02);

        assert!(!probe.is_grounded(true, &body, &ground));
    }

    #[test]
    fn airborne_does_not_reground_on_steep_slope() {
        let ground = FlatGround::sloped(0.0, 50.0);
        let body = AnalyticBody::standing_on(&ground);
        let mut probe = GroundProbe::new(LayerMask::GROUND, 0.3, 0.02);

        assert!(body.is_grounded());
        assert!(!probe.is_grounded(false, &body, &ground));
        assert!((slope_angle_deg(probe.ground_normal()) - 50.0).abs() < 1.0e-3);
    }

    #[test]
    fn airborne_regrounds_on_walkable_slope() {
        let ground = FlatGround::sloped(0.0, 30.0);
        let body = AnalyticBody::standing_on(&ground);
        let mut probe = GroundProbe::new(LayerMask::GROUND, 0.3, 0.02);

        assert!(probe.is_grounded(false, &body, &ground));
    }

    #[test]
    fn missing_ground_defaults_to_world_up() {
        let ground = FlatGround::level(0.0).on_layers(LayerMask(0b100));
        let body = AnalyticBody::standing_on(&FlatGround::level(0.0));
        let mut probe = GroundProbe::new(LayerMask::GROUND, 0.3, 0.02);

        assert_eq!(probe.probe_normal(&body, &ground), world_up());
        assert!(!probe.is_grounded(true, &body, &ground));
    }
}
