//! Movement state resolution.
//!
//! Evaluated once per tick, highest priority first:
//! 1. rising while not grounded (or just jumped): `Jumping`
//! 2. at or past the apex while not grounded (or just jumped): `Falling`
//! 3. roll in progress, or roll requested and allowed: `Rolling`
//! 4. crouch requested and allowed: `Crouching`
//! 5. grounded gait bucket from forward speed and gait toggles
//!
//! Guards are evaluated against the state the character was in at the start of the tick.

use crate::{
    constants::SPEED_EPS,
    integrator::Kinematics,
    intent::{Gait, MovementIntent, MovementRequest},
    settings::MovementSettings,
    state::MovementState,
    types::Vec3,
    utils::flatten,
};

#[inline]
pub fn can_roll(current: MovementState) -> bool {
    !current.is_airborne()
}

#[inline]
pub fn can_crouch(current: MovementState) -> bool {
    !current.is_airborne() && current != MovementState::Rolling
}

#[inline]
pub fn can_jump(grounded: bool, current: MovementState) -> bool {
    grounded && current != MovementState::Rolling
}

/// Per-tick signals the state machine reads.
#[derive(Clone, Copy, Debug)]
pub struct MachineInput<'a> {
    pub grounded: bool,
    /// Body velocity achieved by the previous move.
    pub body_velocity: Vec3,
    /// Body forward direction.
    pub forward: Vec3,
    /// Body-local forward speed.
    pub forward_speed: f32,
    pub intent: &'a MovementIntent,
}

/// A roll in progress: direction sampled at entry and remaining time.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RollCommit {
    vector: Vec3,
    remaining: f32,
}

#[derive(Clone, Debug, Default)]
pub struct MovementStateMachine {
    roll: Option<RollCommit>,
}

impl MovementStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll commit vector while rolling. Lateral integration uses it instead of the intent.
    pub fn roll_vector(&self) -> Option<Vec3> {
        self.roll.map(|r| r.vector)
    }

    pub fn reset(&mut self) {
        self.roll = None;
    }

    /// Resolve the next movement state. Updates the jump flag and step offset in `kin`.
    pub fn resolve(
        &mut self,
        current: MovementState,
        kin: &mut Kinematics,
        input: &MachineInput<'_>,
        settings: &MovementSettings,
        dt: f32,
    ) -> MovementState {
        let next = self.next_state(current, kin, input, settings, dt);
        if next != MovementState::Rolling {
            self.roll = None;
        }
        next
    }

    fn next_state(
        &mut self,
        current: MovementState,
        kin: &mut Kinematics,
        input: &MachineInput<'_>,
        settings: &MovementSettings,
        dt: f32,
    ) -> MovementState {
        let airborne = !input.grounded || kin.jumped_last_frame;
        if airborne {
            kin.jumped_last_frame = false;
            kin.step_offset_active = false;
            return if kin.vertical_velocity > 0.0 {
                MovementState::Jumping
            } else {
                MovementState::Falling
            };
        }
        kin.step_offset_active = true;

        if current == MovementState::Rolling {
            if let Some(roll) = self.roll.as_mut() {
                roll.remaining -= dt;
                if roll.remaining > 0.0 {
                    return MovementState::Rolling;
                }
                log::debug!("roll finished");
            }
        }

        let intent = input.intent;
        if intent.has(MovementRequest::Roll) && can_roll(current) {
            let vector = Self::sample_roll_vector(input, settings);
            log::debug!("roll started along {vector:?}");
            self.roll = Some(RollCommit {
                vector,
                remaining: settings.roll_duration.max(0.0),
            });
            return MovementState::Rolling;
        }

        if intent.has(MovementRequest::Crouch) && can_crouch(current) {
            return MovementState::Crouching;
        }

        Self::gait_bucket(input, intent.gait(), settings)
    }

    /// Keep the current velocity when moving forward, otherwise roll along the facing.
    fn sample_roll_vector(input: &MachineInput<'_>, settings: &MovementSettings) -> Vec3 {
        if input.forward_speed > settings.moving_threshold {
            flatten(input.body_velocity)
        } else {
            flatten(input.forward) * settings.roll_speed.max(0.0)
        }
    }

    fn gait_bucket(input: &MachineInput<'_>, gait: Gait, settings: &MovementSettings) -> MovementState {
        let planar_speed = flatten(input.body_velocity).norm();
        let fwd = input.forward_speed;

        if planar_speed <= settings.moving_threshold {
            return MovementState::Idling;
        }
        // Upper bounds are exclusive by SPEED_EPS so a body held at a cap can promote.
        if gait == Gait::Walk || fwd < settings.walk_speed - SPEED_EPS {
            MovementState::Walking
        } else if gait == Gait::Run || fwd < settings.run_speed - SPEED_EPS {
            MovementState::Running
        } else if gait == Gait::Sprint || fwd > settings.run_speed {
            MovementState::Sprinting
        } else {
            MovementState::Idling
        }
    }
}
