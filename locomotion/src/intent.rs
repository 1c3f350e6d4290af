//! Per-tick movement intent and the sources that produce it.
//!
//! The controller never reads raw input. Each tick it asks its [`IntentSource`] for a
//! [`MovementIntent`]: a planar world-space direction plus discrete requests. Player
//! characters use [`PlayerIntentSource`] (camera-relative stick input), agents use
//! [`AgentIntentSource`] (steer toward a point).

use crate::{
    bitmask_flags::BitmaskFlags,
    define_bitmask_flags,
    state::CharacterState,
    types::{Quat, Vec2, Vec3},
    utils::{self, flatten, normalize_or_zero, planar_distance_sq, to_planar, yaw_rotation},
};

define_bitmask_flags!(
    /// Discrete requests carried by a [`MovementIntent`].
    ///
    /// `Jump` and `Roll` are edge-triggered presses. `Crouch`, `Walk` and `Sprint` are toggles
    /// that the source re-emits every tick while they are on.
    MovementRequest, u8, {
        Jump,
        Roll,
        Crouch,
        Walk,
        Sprint,
    }
);

pub type MovementRequests = BitmaskFlags<u8>;

/// Requested gait for grounded locomotion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gait {
    Walk,
    #[default]
    Run,
    Sprint,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionRequest {
    #[default]
    None,
    Attack,
    Gather,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputDevice {
    #[default]
    KeyboardMouse,
    Gamepad,
}

/// Raw look delta for this tick, before sensitivity scaling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LookInput {
    pub delta: Vec2,
    pub device: InputDevice,
}

/// What a character wants to do this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementIntent {
    /// World-space planar direction. May exceed unit length for diagonal input.
    pub direction: Vec3,
    pub requests: MovementRequests,
    pub action: ActionRequest,
    pub look: Option<LookInput>,
}

impl MovementIntent {
    pub fn toward(direction: Vec3) -> Self {
        Self {
            direction: flatten(direction),
            ..Self::default()
        }
    }

    pub fn with(mut self, request: MovementRequest) -> Self {
        self.requests.add(request);
        self
    }

    #[inline]
    pub fn has(&self, request: MovementRequest) -> bool {
        self.requests.has(request)
    }

    /// Walk wins over sprint when both toggles are on.
    pub fn gait(&self) -> Gait {
        if self.has(MovementRequest::Walk) {
            Gait::Walk
        } else if self.has(MovementRequest::Sprint) {
            Gait::Sprint
        } else {
            Gait::Run
        }
    }
}

/// Read-only view of the character handed to an intent source.
#[derive(Clone, Copy, Debug)]
pub struct IntentContext {
    pub position: Vec3,
    pub rotation: Quat,
    /// Camera yaw in degrees, when the character has a camera rig.
    pub camera_yaw: Option<f32>,
    pub state: CharacterState,
}

/// Produces the intent for one character each tick.
pub trait IntentSource {
    fn next_intent(&mut self, ctx: &IntentContext) -> MovementIntent;
}

impl<T: IntentSource + ?Sized> IntentSource for Box<T> {
    fn next_intent(&mut self, ctx: &IntentContext) -> MovementIntent {
        (**self).next_intent(ctx)
    }
}

/// Input-driven intent for a player character.
///
/// The host feeds device state as it arrives; presses are consumed by the next tick.
#[derive(Clone, Debug, Default)]
pub struct PlayerIntentSource {
    move_input: Vec2,
    look: LookInput,
    jump_pressed: bool,
    roll_pressed: bool,
    crouch_toggled: bool,
    walk_toggled: bool,
    sprint_toggled: bool,
    attack_held: bool,
    gather_held: bool,
}

impl PlayerIntentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stick / WASD input: x strafes right, y moves forward.
    pub fn set_move_input(&mut self, input: Vec2) {
        self.move_input = input;
    }

    /// Accumulate a look delta for this tick.
    pub fn add_look_input(&mut self, delta: Vec2, device: InputDevice) {
        self.look.delta += delta;
        self.look.device = device;
    }

    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
    }

    pub fn press_roll(&mut self) {
        self.roll_pressed = true;
    }

    pub fn toggle_crouch(&mut self) {
        self.crouch_toggled = !self.crouch_toggled;
    }

    pub fn toggle_walk(&mut self) {
        self.walk_toggled = !self.walk_toggled;
    }

    pub fn toggle_sprint(&mut self) {
        self.sprint_toggled = !self.sprint_toggled;
    }

    pub fn set_attack_held(&mut self, held: bool) {
        self.attack_held = held;
    }

    pub fn set_gather_held(&mut self, held: bool) {
        self.gather_held = held;
    }
}

impl IntentSource for PlayerIntentSource {
    fn next_intent(&mut self, ctx: &IntentContext) -> MovementIntent {
        // Movement is relative to the camera; without a camera rig, relative to the body.
        let basis = match ctx.camera_yaw {
            Some(yaw) => yaw_rotation(yaw),
            None => ctx.rotation,
        };
        let forward_xz = normalize_or_zero(flatten(utils::forward(&basis)));
        let right_xz = normalize_or_zero(flatten(utils::right(&basis)));
        let direction = right_xz * self.move_input.x + forward_xz * self.move_input.y;

        let mut requests = MovementRequests::default();
        if std::mem::take(&mut self.jump_pressed) {
            requests.add(MovementRequest::Jump);
        }
        if std::mem::take(&mut self.roll_pressed) {
            requests.add(MovementRequest::Roll);
        }
        if self.crouch_toggled {
            requests.add(MovementRequest::Crouch);
        }
        if self.walk_toggled {
            requests.add(MovementRequest::Walk);
        }
        if self.sprint_toggled {
            requests.add(MovementRequest::Sprint);
        }

        let action = if self.attack_held {
            ActionRequest::Attack
        } else if self.gather_held {
            ActionRequest::Gather
        } else {
            ActionRequest::None
        };

        MovementIntent {
            direction,
            requests,
            action,
            look: Some(std::mem::take(&mut self.look)),
        }
    }
}

/// Steering intent for a non-player character: walk toward a point, stop inside an
/// acceptance radius.
#[derive(Clone, Debug)]
pub struct AgentIntentSource {
    target: Option<Vec3>,
    acceptance_radius: f32,
    gait: Gait,
    crouching: bool,
    pending: MovementRequests,
}

impl AgentIntentSource {
    pub fn new(acceptance_radius: f32) -> Self {
        Self {
            target: None,
            acceptance_radius: acceptance_radius.max(0.0),
            gait: Gait::Run,
            crouching: false,
            pending: MovementRequests::default(),
        }
    }

    pub fn set_target(&mut self, target: Option<Vec3>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn set_gait(&mut self, gait: Gait) {
        self.gait = gait;
    }

    pub fn set_crouching(&mut self, crouching: bool) {
        self.crouching = crouching;
    }

    /// Queue a one-shot request (jump or roll) for the next tick.
    pub fn request(&mut self, request: MovementRequest) {
        self.pending.add(request);
    }
}

impl IntentSource for AgentIntentSource {
    fn next_intent(&mut self, ctx: &IntentContext) -> MovementIntent {
        let mut direction = Vec3::zeros();
        if let Some(target) = self.target {
            let (here, there) = (to_planar(&ctx.position), to_planar(&target));
            if planar_distance_sq(here, there) <= self.acceptance_radius * self.acceptance_radius {
                log::debug!("agent reached target {target:?}");
                self.target = None;
            } else {
                let delta = there - here;
                direction = normalize_or_zero(Vec3::new(delta.x, 0.0, delta.y));
            }
        }

        let mut requests = std::mem::take(&mut self.pending);
        if self.crouching {
            requests.add(MovementRequest::Crouch);
        }
        match self.gait {
            Gait::Walk => requests.add(MovementRequest::Walk),
            Gait::Sprint => requests.add(MovementRequest::Sprint),
            Gait::Run => {}
        }

        MovementIntent {
            direction,
            requests,
            action: ActionRequest::None,
            look: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_at(position: Vec3, camera_yaw: Option<f32>) -> IntentContext {
        IntentContext {
            position,
            rotation: Quat::identity(),
            camera_yaw,
            state: CharacterState::default(),
        }
    }

    #[test]
    fn player_direction_is_camera_relative() {
        let mut source = PlayerIntentSource::new();
        source.set_move_input(Vec2::new(0.0, 1.0));

        let intent = source.next_intent(&ctx_at(Vec3::zeros(), Some(90.0)));
        assert!((intent.direction.x - 1.0).abs() < 1.0e-5);
        assert!(intent.direction.z.abs() < 1.0e-5);
        assert_eq!(intent.direction.y, 0.0);
    }

    #[test]
    fn presses_are_consumed_but_toggles_persist() {
        let mut source = PlayerIntentSource::new();
        source.press_jump();
        source.toggle_crouch();

        let first = source.next_intent(&ctx_at(Vec3::zeros(), None));
        assert!(first.has(MovementRequest::Jump));
        assert!(first.has(MovementRequest::Crouch));

        let second = source.next_intent(&ctx_at(Vec3::zeros(), None));
        assert!(!second.has(MovementRequest::Jump));
        assert!(second.has(MovementRequest::Crouch));
    }

    #[test]
    fn look_delta_is_consumed_each_tick() {
        let mut source = PlayerIntentSource::new();
        source.add_look_input(Vec2::new(2.0, 0.0), InputDevice::Gamepad);
        source.add_look_input(Vec2::new(1.0, 1.0), InputDevice::Gamepad);

        let look = source.next_intent(&ctx_at(Vec3::zeros(), None)).look.unwrap();
        assert_eq!(look.delta, Vec2::new(3.0, 1.0));
        assert_eq!(look.device, InputDevice::Gamepad);

        let look = source.next_intent(&ctx_at(Vec3::zeros(), None)).look.unwrap();
        assert_eq!(look.delta, Vec2::zeros());
    }

    #[test]
    fn attack_wins_over_gather() {
        let mut source = PlayerIntentSource::new();
        source.set_attack_held(true);
        source.set_gather_held(true);
        let intent = source.next_intent(&ctx_at(Vec3::zeros(), None));
        assert_eq!(intent.action, ActionRequest::Attack);
    }

    #[test]
    fn walk_toggle_wins_over_sprint() {
        let intent = MovementIntent::default()
            .with(MovementRequest::Sprint)
            .with(MovementRequest::Walk);
        assert_eq!(intent.gait(), Gait::Walk);
        assert_eq!(MovementIntent::default().gait(), Gait::Run);
    }

    #[test]
    fn agent_steers_toward_target_and_stops_inside_acceptance() {
        let mut agent = AgentIntentSource::new(0.5);
        agent.set_target(Some(Vec3::new(0.0, 3.0, 10.0)));

        let intent = agent.next_intent(&ctx_at(Vec3::zeros(), None));
        assert!((intent.direction - Vec3::z()).norm() < 1.0e-5);

        let intent = agent.next_intent(&ctx_at(Vec3::new(0.0, 0.0, 9.8), None));
        assert_eq!(intent.direction, Vec3::zeros());
        assert_eq!(agent.target(), None);
    }

    #[test]
    fn agent_one_shot_requests_fire_once() {
        let mut agent = AgentIntentSource::new(0.5);
        agent.request(MovementRequest::Jump);
        assert!(agent
            .next_intent(&ctx_at(Vec3::zeros(), None))
            .has(MovementRequest::Jump));
        assert!(!agent
            .next_intent(&ctx_at(Vec3::zeros(), None))
            .has(MovementRequest::Jump));
    }
}
