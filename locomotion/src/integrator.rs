/*!
Velocity integration for one tick.

Vertical and lateral velocity are integrated separately, vertical first. Everything here is a
pure function of the previous kinematic state, the resolved movement state and the settings,
so it can be tested without a physics world.

Order of the vertical step
1. gravity
2. grounded anti-bump (clamp a downward velocity to `-anti_bump`)
3. jump impulse
4. launch assist when a grounded state is left without jumping
5. terminal velocity clamp

Lateral step
1. acceleration and speed cap chosen by movement state
2. add the intent (or roll commit) delta to the planar body velocity
3. drag, snapping to zero instead of overshooting
4. clamp to the speed cap
5. while airborne, deflect along surfaces steeper than the slope limit
*/

use crate::{
    settings::{JumpImpulse, MovementSettings},
    state::MovementState,
    types::Vec3,
    utils::{clamp_magnitude, flatten, normalize_or_zero, project_on_plane, slope_angle_deg},
};

/// Kinematic state carried between ticks. Not persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Kinematics {
    /// Signed vertical speed, negative is falling (m/s).
    pub vertical_velocity: f32,
    /// Velocity handed to the body besides the vertical speed. Normally planar; steep-wall
    /// deflection can give it a vertical component.
    pub lateral_velocity: Vec3,
    /// Movement state at the start of the current tick.
    pub last_movement_state: MovementState,
    /// Set for one tick after a jump impulse is applied.
    pub jumped_last_frame: bool,
    pub step_offset_active: bool,
}

impl Kinematics {
    pub fn new() -> Self {
        Self {
            step_offset_active: true,
            ..Self::default()
        }
    }

    /// Velocity passed to the body this tick.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        Vec3::new(
            self.lateral_velocity.x,
            self.lateral_velocity.y + self.vertical_velocity,
            self.lateral_velocity.z,
        )
    }
}

/// Inputs to the vertical step that come from the state machine and ground probe.
#[derive(Clone, Copy, Debug, Default)]
pub struct VerticalStep {
    pub grounded: bool,
    /// Jump requested and allowed this tick.
    pub jump: bool,
    /// The previous tick ended in a grounded state.
    pub was_grounded_state: bool,
}

/// Result of the vertical step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalOutcome {
    pub velocity: f32,
    pub jumped: bool,
}

pub fn integrate_vertical(
    velocity: f32,
    dt: f32,
    settings: &MovementSettings,
    step: VerticalStep,
) -> VerticalOutcome {
    let anti_bump = settings.anti_bump();
    let mut v = velocity - settings.gravity.max(0.0) * dt;

    if step.grounded && v < 0.0 {
        v = -anti_bump;
    }

    let jumped = step.jump;
    if jumped {
        let impulse = settings.jump_impulse_speed();
        v = match settings.jump_impulse {
            // The grounded downward bias is not part of the launch velocity.
            JumpImpulse::Additive => v.max(0.0) + impulse,
            JumpImpulse::Compounding => v + v + impulse,
        };
    }

    if step.was_grounded_state && !step.grounded {
        v += anti_bump;
    }

    let terminal = settings.terminal_velocity.abs();
    if v.abs() > terminal {
        // Always clamps downward, including an upward overshoot.
        v = -terminal;
    }

    VerticalOutcome {
        velocity: v,
        jumped,
    }
}

/// Acceleration, speed cap and drag for one movement state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LateralParams {
    pub acceleration: f32,
    pub max_speed: f32,
    pub drag: f32,
}

impl LateralParams {
    pub fn for_state(state: MovementState, m: &MovementSettings) -> Self {
        use MovementState::*;

        let (acceleration, max_speed) = if state.is_airborne() {
            (m.in_air_acceleration, m.sprint_speed)
        } else {
            match state {
                Rolling => (m.roll_acceleration, m.roll_speed),
                Crouching => (m.crouch_acceleration, m.crouch_speed),
                Walking => (m.walk_acceleration, m.walk_speed),
                Sprinting => (m.sprint_acceleration, m.sprint_speed),
                _ => (m.run_acceleration, m.run_speed),
            }
        };
        let drag = if state.is_airborne() {
            m.in_air_drag
        } else {
            m.drag
        };

        Self {
            acceleration: acceleration.max(0.0),
            max_speed: max_speed.max(0.0),
            drag: drag.max(0.0),
        }
    }
}

/// Integrate planar velocity.
///
/// `current` is the body's actual velocity (its vertical part is ignored). `direction` is the
/// intent direction, or the roll commit vector while rolling.
pub fn integrate_lateral(current: Vec3, direction: Vec3, params: LateralParams, dt: f32) -> Vec3 {
    let delta = flatten(direction) * (params.acceleration * dt);
    let v = flatten(current) + delta;

    let drag_step = params.drag * dt;
    let v = if v.norm() > drag_step {
        v - normalize_or_zero(v) * drag_step
    } else {
        Vec3::zeros()
    };

    clamp_magnitude(v, params.max_speed)
}

/// Project `velocity` onto a surface steeper than `slope_limit_deg` while moving downward.
pub fn deflect_steep_wall(
    velocity: Vec3,
    normal: Vec3,
    slope_limit_deg: f32,
    vertical_velocity: f32,
) -> Vec3 {
    let too_steep = slope_angle_deg(normal) > slope_limit_deg;
    if too_steep && vertical_velocity < 0.0 {
        project_on_plane(velocity, normal)
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn tilted(angle_deg: f32) -> Vec3 {
        let a = angle_deg.to_radians();
        Vec3::new(a.sin(), a.cos(), 0.0)
    }

    #[test]
    fn jump_from_rest_yields_the_impulse() {
        let m = MovementSettings::default();
        let out = integrate_vertical(
            0.0,
            DT,
            &m,
            VerticalStep {
                grounded: true,
                jump: true,
                was_grounded_state: true,
            },
        );
        assert!(out.jumped);
        assert!((out.velocity - m.jump_impulse_speed()).abs() < 1.0e-5);
    }

    #[test]
    fn jump_ignores_the_grounded_bias() {
        let m = MovementSettings::default();
        let step = VerticalStep {
            grounded: true,
            jump: true,
            was_grounded_state: true,
        };
        let out = integrate_vertical(-m.anti_bump(), DT, &m, step);
        assert!((out.velocity - m.jump_impulse_speed()).abs() < 1.0e-5);
    }

    #[test]
    fn additive_and_compounding_impulses_differ_when_rising() {
        let additive = MovementSettings::default();
        let compounding = MovementSettings {
            jump_impulse: JumpImpulse::Compounding,
            ..MovementSettings::default()
        };
        let step = VerticalStep {
            grounded: true,
            jump: true,
            was_grounded_state: true,
        };
        let base = 2.0 - additive.gravity * DT;

        let a = integrate_vertical(2.0, DT, &additive, step).velocity;
        let c = integrate_vertical(2.0, DT, &compounding, step).velocity;
        assert!((a - (base + additive.jump_impulse_speed())).abs() < 1.0e-4);
        assert!((c - (2.0 * base + additive.jump_impulse_speed())).abs() < 1.0e-4);
    }

    #[test]
    fn compounding_from_the_ground_doubles_the_bias() {
        let m = MovementSettings {
            jump_impulse: JumpImpulse::Compounding,
            ..MovementSettings::default()
        };
        let step = VerticalStep {
            grounded: true,
            jump: true,
            was_grounded_state: true,
        };
        let out = integrate_vertical(0.0, DT, &m, step);
        let expected = m.jump_impulse_speed() - 2.0 * m.anti_bump();
        assert!((out.velocity - expected).abs() < 1.0e-4);
        assert!(out.velocity < 0.0);
    }

    #[test]
    fn grounded_downward_velocity_becomes_anti_bump() {
        let m = MovementSettings::default();
        let out = integrate_vertical(
            -0.5,
            DT,
            &m,
            VerticalStep {
                grounded: true,
                ..VerticalStep::default()
            },
        );
        assert_eq!(out.velocity, -m.anti_bump());
        assert!(!out.jumped);
    }

    #[test]
    fn leaving_ground_adds_launch_assist() {
        let m = MovementSettings::default();
        let out = integrate_vertical(
            -m.anti_bump(),
            DT,
            &m,
            VerticalStep {
                grounded: false,
                jump: false,
                was_grounded_state: true,
            },
        );
        let expected = -m.anti_bump() - m.gravity * DT + m.anti_bump();
        assert!((out.velocity - expected).abs() < 1.0e-5);
    }

    #[test]
    fn terminal_clamp_never_exceeds_and_biases_downward() {
        let m = MovementSettings::default();
        let airborne = VerticalStep::default();

        let down = integrate_vertical(-80.0, DT, &m, airborne).velocity;
        assert_eq!(down, -m.terminal_velocity);

        // Upward overshoot is pulled to the downward limit.
        let up = integrate_vertical(80.0, DT, &m, airborne).velocity;
        assert_eq!(up, -m.terminal_velocity);

        let inside = integrate_vertical(-10.0, DT, &m, airborne).velocity;
        assert!(inside > -m.terminal_velocity && inside < 0.0);
    }

    #[test]
    fn drag_snaps_small_velocity_to_zero() {
        let params = LateralParams::for_state(MovementState::Running, &MovementSettings::default());
        let v = integrate_lateral(Vec3::new(0.2, 0.0, 0.0), Vec3::zeros(), params, DT);
        assert_eq!(v, Vec3::zeros());
    }

    #[test]
    fn lateral_speed_never_exceeds_state_cap() {
        let m = MovementSettings::default();
        for state in [
            MovementState::Walking,
            MovementState::Running,
            MovementState::Sprinting,
            MovementState::Crouching,
            MovementState::Rolling,
            MovementState::Jumping,
        ] {
            let params = LateralParams::for_state(state, &m);
            let mut v = Vec3::zeros();
            for _ in 0..240 {
                v = integrate_lateral(v, Vec3::new(1.0, 0.0, 1.0), params, DT);
                assert!(v.norm() <= params.max_speed + 1.0e-5, "{state:?}");
            }
        }
    }

    #[test]
    fn lateral_ignores_vertical_body_velocity() {
        let params = LateralParams::for_state(MovementState::Running, &MovementSettings::default());
        let v = integrate_lateral(Vec3::new(0.0, -30.0, 3.0), Vec3::zeros(), params, DT);
        assert_eq!(v.y, 0.0);
        assert!(v.z > 2.0);
    }

    #[test]
    fn airborne_uses_air_acceleration_and_sprint_cap() {
        let m = MovementSettings::default();
        let p = LateralParams::for_state(MovementState::Falling, &m);
        assert_eq!(p.acceleration, m.in_air_acceleration);
        assert_eq!(p.max_speed, m.sprint_speed);
        assert_eq!(p.drag, m.in_air_drag);
    }

    #[test]
    fn zero_settings_produce_no_nan() {
        let m = MovementSettings {
            walk_acceleration: 0.0,
            walk_speed: 0.0,
            run_acceleration: -3.0,
            run_speed: -1.0,
            drag: 0.0,
            ..MovementSettings::default()
        };
        let params = LateralParams::for_state(MovementState::Running, &m);
        let v = integrate_lateral(Vec3::new(1.0, 0.0, 0.0), Vec3::z(), params, DT);
        assert_eq!(v, Vec3::zeros());
    }

    #[test]
    fn steep_wall_removes_into_slope_component() {
        let n = tilted(50.0);
        let v = Vec3::new(-3.0, 0.0, 1.0);
        let out = deflect_steep_wall(v, n, 45.0, -1.0);
        assert!(out.dot(&n).abs() < 1.0e-5);
        assert!((out.z - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn walkable_slope_is_not_deflected() {
        let v = Vec3::new(-3.0, 0.0, 1.0);
        assert_eq!(deflect_steep_wall(v, tilted(30.0), 45.0, -1.0), v);
    }

    #[test]
    fn rising_character_is_not_deflected() {
        let v = Vec3::new(-3.0, 0.0, 1.0);
        assert_eq!(deflect_steep_wall(v, tilted(50.0), 45.0, 2.0), v);
    }
}
