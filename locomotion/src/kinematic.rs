//! Character body backed by Rapier's kinematic character controller.
//!
//! The body is not inserted into the world; each move sweeps a Y-aligned capsule against the
//! shared static colliders. The controller keeps `skin` of separation, slides along walls,
//! refuses to climb slopes past the slope limit and auto-steps ledges up to the step offset
//! while stepping is enabled.

use std::sync::Arc;

use rapier3d::{
    control::{CharacterAutostep, CharacterLength, KinematicCharacterController},
    na::Translation3,
    prelude::{Capsule, QueryFilter},
};

use crate::{
    body::CharacterBody,
    rapier_world::StaticWorld,
    settings::BodySettings,
    types::{CapsuleSpec, Iso, Quat, Vec3},
};

pub struct KinematicBody {
    world: Arc<StaticWorld>,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    grounded: bool,
    capsule: CapsuleSpec,
    slope_limit: f32,
    step_offset: f32,
    step_enabled: bool,
    skin: f32,
}

impl KinematicBody {
    /// Body with its capsule center at `position`.
    pub fn new(world: Arc<StaticWorld>, settings: &BodySettings, position: Vec3) -> Self {
        Self {
            world,
            position,
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            grounded: false,
            capsule: settings.capsule(),
            slope_limit: settings.slope_limit,
            step_offset: settings.step_offset.max(0.0),
            step_enabled: true,
            skin: settings.skin.max(0.0),
        }
    }

    /// Body standing with its feet `skin` above `feet`.
    pub fn standing_at(world: Arc<StaticWorld>, settings: &BodySettings, feet: Vec3) -> Self {
        let capsule = settings.capsule();
        let center = feet + Vec3::y() * (capsule.center_to_feet() + settings.skin.max(0.0));
        Self::new(world, settings, center)
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn is_step_offset_enabled(&self) -> bool {
        self.step_enabled
    }

    fn controller(&self) -> KinematicCharacterController {
        let slope = self.slope_limit.to_radians();
        let autostep = (self.step_enabled && self.step_offset > 0.0).then(|| CharacterAutostep {
            max_height: CharacterLength::Absolute(self.step_offset),
            min_width: CharacterLength::Absolute(self.capsule.radius * 0.5),
            include_dynamic_bodies: false,
        });

        KinematicCharacterController {
            offset: CharacterLength::Absolute(self.skin),
            max_slope_climb_angle: slope,
            min_slope_slide_angle: slope,
            snap_to_ground: None,
            autostep,
            ..KinematicCharacterController::default()
        }
    }
}

impl CharacterBody for KinematicBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn capsule(&self) -> CapsuleSpec {
        self.capsule
    }

    fn slope_limit_deg(&self) -> f32 {
        self.slope_limit
    }

    fn set_step_offset_enabled(&mut self, enabled: bool) {
        self.step_enabled = enabled;
    }

    fn move_with_velocity(&mut self, velocity: Vec3, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let kcc = self.controller();
        let query_pipeline = self
            .world
            .query_pipeline(QueryFilter::only_fixed().exclude_sensors());
        let shape = Capsule::new_y(self.capsule.half_height, self.capsule.radius);
        // The capsule stays upright; yaw does not change its collision.
        let pose = Iso::from_parts(Translation3::from(self.position), Quat::identity());

        let correction = kcc.move_shape(dt, &query_pipeline, &shape, &pose, velocity * dt, |_| {});

        self.position += correction.translation;
        self.velocity = correction.translation / dt;
        self.grounded = correction.grounded;
    }

    fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::zeros();
        self.grounded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rapier_world::{ColliderShapeDef, StaticColliderDef};

    const DT: f32 = 1.0 / 60.0;

    fn floor_world() -> Arc<StaticWorld> {
        Arc::new(StaticWorld::build(vec![StaticColliderDef::new(
            0,
            Vec3::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )]))
    }

    #[test]
    fn floor_blocks_downward_motion() {
        let settings = BodySettings::default();
        let mut body = KinematicBody::standing_at(floor_world(), &settings, Vec3::zeros());
        let start = body.position();

        body.move_with_velocity(Vec3::new(0.0, -7.0, 0.0), DT);
        assert!(body.is_grounded());
        assert!((body.position().y - start.y).abs() < 0.05);
    }

    #[test]
    fn free_fall_moves_the_full_translation() {
        let settings = BodySettings::default();
        let mut body =
            KinematicBody::standing_at(floor_world(), &settings, Vec3::new(0.0, 5.0, 0.0));
        let start = body.position();

        body.move_with_velocity(Vec3::new(1.0, -2.0, 0.0), DT);
        assert!(!body.is_grounded());
        let moved = body.position() - start;
        assert!((moved - Vec3::new(1.0, -2.0, 0.0) * DT).norm() < 1.0e-4);
        assert!((body.velocity() - Vec3::new(1.0, -2.0, 0.0)).norm() < 1.0e-2);
    }

    #[test]
    fn teleport_clears_velocity() {
        let settings = BodySettings::default();
        let mut body =
            KinematicBody::standing_at(floor_world(), &settings, Vec3::new(0.0, 5.0, 0.0));
        body.move_with_velocity(Vec3::new(0.0, -3.0, 0.0), DT);
        body.teleport(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.velocity(), Vec3::zeros());
        assert_eq!(body.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn step_offset_toggle_is_tracked() {
        let settings = BodySettings::default();
        let mut body = KinematicBody::standing_at(floor_world(), &settings, Vec3::zeros());
        assert!(body.is_step_offset_enabled());
        body.set_step_offset_enabled(false);
        assert!(!body.is_step_offset_enabled());
    }
}
