//! Camera look and model re-orientation for player characters.
//!
//! The camera yaw/pitch follow look input. The body turns toward the camera yaw continuously
//! while moving; while idling it only turns once the mismatch exceeds the idle tolerance, and
//! then keeps turning in one locked direction for `rotate_to_target_time`.

use crate::{
    intent::{InputDevice, LookInput},
    settings::OrientationSettings,
    state::{CharacterState, MovementState},
    types::Quat,
    utils::{
        flatten, forward, normalize_or_zero, signed_angle_deg, world_up, wrap_angle_deg, yaw_of,
        yaw_rotation,
    },
};

/// Orientation outputs for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationUpdate {
    /// New body rotation.
    pub rotation: Quat,
    /// Signed angle from body forward to camera forward (degrees), positive to the right.
    pub rotation_mismatch: f32,
    pub is_rotating_to_target: bool,
}

#[derive(Clone, Debug)]
pub struct OrientationController {
    settings: OrientationSettings,
    camera_yaw: f32,
    camera_pitch: f32,
    target_yaw: f32,
    rotation_mismatch: f32,
    rotating_to_target_timer: f32,
    rotating_clockwise: bool,
}

impl OrientationController {
    pub fn new(settings: OrientationSettings, initial_yaw: f32) -> Self {
        Self {
            settings,
            camera_yaw: initial_yaw,
            camera_pitch: 0.0,
            target_yaw: initial_yaw,
            rotation_mismatch: 0.0,
            rotating_to_target_timer: 0.0,
            rotating_clockwise: false,
        }
    }

    pub fn camera_yaw(&self) -> f32 {
        self.camera_yaw
    }

    pub fn camera_pitch(&self) -> f32 {
        self.camera_pitch
    }

    pub fn rotation_mismatch(&self) -> f32 {
        self.rotation_mismatch
    }

    pub fn is_rotating_to_target(&self) -> bool {
        self.rotating_to_target_timer > 0.0
    }

    /// Point camera and body at `yaw` and stop any idle re-orientation.
    pub fn reset(&mut self, yaw: f32) {
        self.camera_yaw = yaw;
        self.camera_pitch = 0.0;
        self.target_yaw = yaw;
        self.rotation_mismatch = 0.0;
        self.rotating_to_target_timer = 0.0;
    }

    pub fn update(
        &mut self,
        body_rotation: Quat,
        look: Option<LookInput>,
        state: &CharacterState,
        dt: f32,
    ) -> OrientationUpdate {
        self.apply_look(look.unwrap_or_default());
        self.rotation_mismatch = self.mismatch(&body_rotation);

        let mut rotation = body_rotation;
        if !state.is_dead() {
            let tolerance = self.settings.idle_rotation_tolerance;
            if !state.is(MovementState::Idling) {
                rotation = self.rotate_to_target(&rotation, dt);
            } else if self.rotation_mismatch.abs() > tolerance || self.is_rotating_to_target() {
                rotation = self.update_idle_rotation(&rotation, tolerance, dt);
            }
        }

        self.rotation_mismatch = self.mismatch(&rotation);
        OrientationUpdate {
            rotation,
            rotation_mismatch: self.rotation_mismatch,
            is_rotating_to_target: self.is_rotating_to_target(),
        }
    }

    fn apply_look(&mut self, look: LookInput) {
        let s = &self.settings;
        let (mut x, mut y) = (look.delta.x, look.delta.y);
        if look.device == InputDevice::Gamepad {
            x *= s.gamepad_look_x_multiplier;
            y *= s.gamepad_look_y_multiplier;
        }

        let limit = s.look_limit_v.abs();
        self.camera_yaw = wrap_angle_deg(self.camera_yaw + s.look_sense_h * x);
        self.camera_pitch = (self.camera_pitch - s.look_sense_v * y).clamp(-limit, limit);
        self.target_yaw = self.camera_yaw;
    }

    fn mismatch(&self, body_rotation: &Quat) -> f32 {
        let body_forward = normalize_or_zero(flatten(forward(body_rotation)));
        let camera_forward = normalize_or_zero(flatten(forward(&yaw_rotation(self.camera_yaw))));
        signed_angle_deg(body_forward, camera_forward, world_up())
    }

    fn update_idle_rotation(&mut self, rotation: &Quat, tolerance: f32, dt: f32) -> Quat {
        // The direction only locks when no re-orientation is running.
        if !self.is_rotating_to_target() && self.rotation_mismatch.abs() > tolerance {
            self.rotating_to_target_timer = self.settings.rotate_to_target_time;
            self.rotating_clockwise = self.rotation_mismatch > 0.0;
            log::debug!(
                "idle re-orientation locked {}",
                if self.rotating_clockwise { "clockwise" } else { "counter-clockwise" }
            );
        }

        self.rotating_to_target_timer -= dt;

        let agrees = if self.rotating_clockwise {
            self.rotation_mismatch > 0.0
        } else {
            self.rotation_mismatch < 0.0
        };
        if agrees {
            self.rotate_to_target(rotation, dt)
        } else {
            *rotation
        }
    }

    fn rotate_to_target(&self, rotation: &Quat, dt: f32) -> Quat {
        approach_yaw(rotation, self.target_yaw, self.settings.model_rotation_speed, dt)
    }
}

/// Exponential approach from `rotation` toward `target_yaw` along the short arc.
pub fn approach_yaw(rotation: &Quat, target_yaw: f32, rate: f32, dt: f32) -> Quat {
    let t = (rate * dt).clamp(0.0, 1.0);
    let yaw = yaw_of(rotation);
    let delta = wrap_angle_deg(target_yaw - yaw);
    yaw_rotation(yaw + delta * t)
}
