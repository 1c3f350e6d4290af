//! Analytic stand-ins for the physics collaborators, for unit tests.

use std::{cell::Cell, rc::Rc};

use crate::{
    body::CharacterBody,
    ground::GroundSensor,
    types::{CapsuleSpec, LayerMask, Quat, SurfaceHit, Vec3},
    utils::world_up,
};

const CONTACT_EPS: f32 = 1.0e-3;

/// An infinite plane through `(0, height, 0)`, optionally tilted about +Z.
#[derive(Clone, Copy, Debug)]
pub struct FlatGround {
    pub point: Vec3,
    pub normal: Vec3,
    pub layers: LayerMask,
}

impl FlatGround {
    pub fn level(height: f32) -> Self {
        Self {
            point: Vec3::new(0.0, height, 0.0),
            normal: world_up(),
            layers: LayerMask::GROUND,
        }
    }

    pub fn sloped(height: f32, angle_deg: f32) -> Self {
        let a = angle_deg.to_radians();
        Self {
            point: Vec3::new(0.0, height, 0.0),
            normal: Vec3::new(a.sin(), a.cos(), 0.0),
            layers: LayerMask::GROUND,
        }
    }

    pub fn on_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(&(p - self.point))
    }
}

impl GroundSensor for FlatGround {
    fn check_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> bool {
        mask.intersects(self.layers) && self.signed_distance(center) <= radius
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        translation: Vec3,
        mask: LayerMask,
    ) -> Option<SurfaceHit> {
        if !mask.intersects(self.layers) {
            return None;
        }
        let gap = self.signed_distance(origin) - radius;
        if gap <= 0.0 {
            return Some(SurfaceHit {
                normal: self.normal,
                fraction: 0.0,
            });
        }
        let approach = self.normal.dot(&translation);
        if approach >= 0.0 {
            return None;
        }
        let fraction = gap / -approach;
        (fraction <= 1.0).then_some(SurfaceHit {
            normal: self.normal,
            fraction,
        })
    }
}

/// A capsule that moves freely and is pushed out of a single [`FlatGround`].
#[derive(Clone, Debug)]
pub struct AnalyticBody {
    pub ground: FlatGround,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub grounded: bool,
    pub capsule: CapsuleSpec,
    pub slope_limit: f32,
    pub step_enabled: bool,
    /// Calls to `move_with_velocity`, shared so a test can read it after handing the body off.
    pub moves: Rc<Cell<usize>>,
}

impl AnalyticBody {
    pub fn standing_on(ground: &FlatGround) -> Self {
        let capsule = CapsuleSpec {
            radius: 0.3,
            half_height: 0.6,
        };
        let lower = ground.point + ground.normal * capsule.radius;
        Self {
            ground: *ground,
            position: lower + world_up() * capsule.half_height,
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            grounded: true,
            capsule,
            slope_limit: 45.0,
            step_enabled: true,
            moves: Rc::default(),
        }
    }

    /// Penetration-resolve the capsule and report whether it ends touching the plane.
    fn resolve(&mut self) -> bool {
        let lower = self.position - world_up() * self.capsule.half_height;
        let gap = self.ground.signed_distance(lower) - self.capsule.radius;
        if gap < 0.0 {
            self.position -= self.ground.normal * gap;
        }
        gap <= CONTACT_EPS
    }
}

impl CharacterBody for AnalyticBody {
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
        let start = self.position;
        self.position += velocity * dt;
        self.grounded = self.resolve();
        self.velocity = if dt > 0.0 {
            (self.position - start) / dt
        } else {
            Vec3::zeros()
        };
        self.moves.set(self.moves.get() + 1);
    }

    fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::zeros();
        self.grounded = self.resolve();
    }
}
