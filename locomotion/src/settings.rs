/*!
Character controller settings.

These structs centralize every tunable used by the state machine, integrator, ground probe,
orientation controller, health component and animation bridge. Defaults reproduce the stock
character's values, so a settings file only has to name what it changes.

Notes
- Distances are in meters, time in seconds, angles in degrees (converted at use sites).
- Every struct is `#[serde(default)]`; missing TOML fields fall back to the defaults.
- Speeds and accelerations are clamped to be non-negative where they are used, so a bad
  value degrades movement instead of producing NaN. `validate` rejects values that cannot be
  simulated, such as negative gravity or a non-positive terminal velocity.
*/

use std::path::Path;

use serde::Deserialize;

use crate::{
    animation::AnimationSettings,
    constants::{DEFAULT_SKIN, GROUND_PROBE_DISTANCE},
    error::LocomotionError,
    types::{CapsuleSpec, LayerMask},
};

/// How a jump request combines with the current vertical velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpImpulse {
    /// `v = max(v, 0) + sqrt(jump_speed * 3 * gravity)`, ignoring the grounded downward bias.
    #[default]
    Additive,
    /// `v += v + sqrt(jump_speed * 3 * gravity)`, applied after the grounded clamp. From the
    /// ground `v` is `-anti_bump`, so the launch is `impulse - 2 * anti_bump`; with the stock
    /// tuning that is negative and the character does not leave the ground.
    Compounding,
}

/// Acceleration, speed caps, gravity and drag for the velocity integrator.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    pub walk_acceleration: f32,
    pub walk_speed: f32,
    pub run_acceleration: f32,
    pub run_speed: f32,
    pub sprint_acceleration: f32,
    pub sprint_speed: f32,
    pub crouch_acceleration: f32,
    pub crouch_speed: f32,
    pub roll_acceleration: f32,
    pub roll_speed: f32,
    /// How long a roll commits the character once started (seconds).
    pub roll_duration: f32,
    pub in_air_acceleration: f32,
    /// Drag magnitude while grounded (m/s^2).
    pub drag: f32,
    /// Drag magnitude while airborne (m/s^2).
    pub in_air_drag: f32,
    /// Gravity magnitude (positive, m/s^2).
    pub gravity: f32,
    /// Maximum vertical speed magnitude (m/s).
    pub terminal_velocity: f32,
    pub jump_speed: f32,
    pub jump_impulse: JumpImpulse,
    /// Planar speeds at or below this are considered standing still (m/s).
    pub moving_threshold: f32,
    /// Layers that count as ground for the ground probe.
    pub ground_layers: LayerMask,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            walk_acceleration: 25.0,
            walk_speed: 2.0,
            run_acceleration: 35.0,
            run_speed: 4.0,
            sprint_acceleration: 50.0,
            sprint_speed: 7.0,
            crouch_acceleration: 15.0,
            crouch_speed: 1.2,
            roll_acceleration: 25.0,
            roll_speed: 2.5,
            roll_duration: 0.6,
            in_air_acceleration: 25.0,
            drag: 20.0,
            in_air_drag: 5.0,
            gravity: 25.0,
            terminal_velocity: 50.0,
            jump_speed: 0.8,
            jump_impulse: JumpImpulse::Additive,
            moving_threshold: 0.01,
            ground_layers: LayerMask::GROUND,
        }
    }
}

impl MovementSettings {
    /// Downward bias applied while grounded, and upward assist when leaving the ground.
    #[inline]
    pub fn anti_bump(&self) -> f32 {
        self.sprint_speed.max(0.0)
    }

    /// Vertical impulse added by a jump.
    #[inline]
    pub fn jump_impulse_speed(&self) -> f32 {
        (self.jump_speed.max(0.0) * 3.0 * self.gravity.max(0.0)).sqrt()
    }
}

/// Physical body dimensions and contact tolerances.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BodySettings {
    pub radius: f32,
    pub half_height: f32,
    /// Steepest walkable slope (degrees).
    pub slope_limit: f32,
    /// Tallest ledge climbed automatically while grounded (meters).
    pub step_offset: f32,
    /// Separation kept from surfaces (meters).
    pub skin: f32,
    /// Extra distance swept below the capsule when probing the ground normal (meters).
    pub ground_probe_distance: f32,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            radius: 0.3,
            half_height: 0.6,
            slope_limit: 45.0,
            step_offset: 0.3,
            skin: DEFAULT_SKIN,
            ground_probe_distance: GROUND_PROBE_DISTANCE,
        }
    }
}

impl BodySettings {
    pub fn capsule(&self) -> CapsuleSpec {
        CapsuleSpec {
            radius: self.radius,
            half_height: self.half_height,
        }
    }
}

/// Camera look and model re-orientation for player-driven characters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrientationSettings {
    /// Exponential approach rate toward the target yaw (1/s).
    pub model_rotation_speed: f32,
    /// How long an idle re-orientation keeps its locked direction (seconds).
    pub rotate_to_target_time: f32,
    pub look_sense_h: f32,
    pub look_sense_v: f32,
    /// Camera pitch limit (degrees, symmetric).
    pub look_limit_v: f32,
    pub gamepad_look_x_multiplier: f32,
    pub gamepad_look_y_multiplier: f32,
    /// Rotation mismatch that triggers an idle re-orientation (degrees).
    pub idle_rotation_tolerance: f32,
}

impl Default for OrientationSettings {
    fn default() -> Self {
        Self {
            model_rotation_speed: 10.0,
            rotate_to_target_time: 0.67,
            look_sense_h: 0.1,
            look_sense_v: 0.1,
            look_limit_v: 89.0,
            gamepad_look_x_multiplier: 5.0,
            gamepad_look_y_multiplier: 5.0,
            idle_rotation_tolerance: 90.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub max_health: f32,
    pub starting_health: f32,
    /// Delay between health reaching zero and the delayed health-gone event (seconds).
    pub health_gone_delay: f32,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            starting_health: 100.0,
            health_gone_delay: 5.0,
        }
    }
}

/// Everything a character needs, as loaded from a settings file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    pub movement: MovementSettings,
    pub body: BodySettings,
    pub orientation: OrientationSettings,
    pub health: HealthSettings,
    pub animation: AnimationSettings,
}

impl CharacterSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load and validate settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, LocomotionError> {
        let content = std::fs::read_to_string(path).map_err(|source| LocomotionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = Self::from_toml_str(&content).map_err(|source| LocomotionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that cannot be simulated; warn about values that will be clamped.
    pub fn validate(&self) -> Result<(), LocomotionError> {
        let m = &self.movement;
        let b = &self.body;
        let o = &self.orientation;
        let h = &self.health;
        let a = &self.animation;

        let movement: [(&'static str, f32); 18] = [
            ("movement.walk_acceleration", m.walk_acceleration),
            ("movement.walk_speed", m.walk_speed),
            ("movement.run_acceleration", m.run_acceleration),
            ("movement.run_speed", m.run_speed),
            ("movement.sprint_acceleration", m.sprint_acceleration),
            ("movement.sprint_speed", m.sprint_speed),
            ("movement.crouch_acceleration", m.crouch_acceleration),
            ("movement.crouch_speed", m.crouch_speed),
            ("movement.roll_acceleration", m.roll_acceleration),
            ("movement.roll_speed", m.roll_speed),
            ("movement.roll_duration", m.roll_duration),
            ("movement.in_air_acceleration", m.in_air_acceleration),
            ("movement.drag", m.drag),
            ("movement.in_air_drag", m.in_air_drag),
            ("movement.gravity", m.gravity),
            ("movement.terminal_velocity", m.terminal_velocity),
            ("movement.jump_speed", m.jump_speed),
            ("movement.moving_threshold", m.moving_threshold),
        ];
        let other: [(&'static str, f32); 20] = [
            ("body.radius", b.radius),
            ("body.half_height", b.half_height),
            ("body.slope_limit", b.slope_limit),
            ("body.step_offset", b.step_offset),
            ("body.skin", b.skin),
            ("body.ground_probe_distance", b.ground_probe_distance),
            ("orientation.model_rotation_speed", o.model_rotation_speed),
            ("orientation.rotate_to_target_time", o.rotate_to_target_time),
            ("orientation.look_sense_h", o.look_sense_h),
            ("orientation.look_sense_v", o.look_sense_v),
            ("orientation.look_limit_v", o.look_limit_v),
            ("orientation.gamepad_look_x_multiplier", o.gamepad_look_x_multiplier),
            ("orientation.gamepad_look_y_multiplier", o.gamepad_look_y_multiplier),
            ("orientation.idle_rotation_tolerance", o.idle_rotation_tolerance),
            ("health.max_health", h.max_health),
            ("health.starting_health", h.starting_health),
            ("health.health_gone_delay", h.health_gone_delay),
            ("animation.forward_smoothing", a.forward_smoothing),
            ("animation.lateral_smoothing", a.lateral_smoothing),
            ("animation.vertical_smoothing", a.vertical_smoothing),
        ];

        for (name, value) in movement.into_iter().chain(other) {
            if !value.is_finite() {
                return Err(LocomotionError::InvalidSetting {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }

        if m.gravity < 0.0 {
            return Err(LocomotionError::InvalidSetting {
                name: "movement.gravity",
                value: m.gravity,
                reason: "gravity is a magnitude and cannot be negative",
            });
        }
        if m.terminal_velocity <= 0.0 {
            return Err(LocomotionError::InvalidSetting {
                name: "movement.terminal_velocity",
                value: m.terminal_velocity,
                reason: "terminal velocity must be positive",
            });
        }
        for (name, value) in movement {
            if value < 0.0 {
                log::warn!("{name} = {value} is negative and will be treated as 0");
            }
        }

        if b.radius <= 0.0 {
            return Err(LocomotionError::InvalidSetting {
                name: "body.radius",
                value: b.radius,
                reason: "capsule radius must be positive",
            });
        }
        if b.half_height < 0.0 {
            return Err(LocomotionError::InvalidSetting {
                name: "body.half_height",
                value: b.half_height,
                reason: "capsule half height cannot be negative",
            });
        }
        if !(0.0..=90.0).contains(&b.slope_limit) {
            return Err(LocomotionError::InvalidSetting {
                name: "body.slope_limit",
                value: b.slope_limit,
                reason: "slope limit must be within 0..=90 degrees",
            });
        }
        if h.max_health <= 0.0 {
            return Err(LocomotionError::InvalidSetting {
                name: "health.max_health",
                value: h.max_health,
                reason: "max health must be positive",
            });
        }

        Ok(())
    }
}
