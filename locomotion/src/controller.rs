/*!
The character controller: one instance per character.

Per tick, in order:
1. derive body-local speeds from the velocity the body achieved last tick
2. pull an intent from the intent source and run health timers
3. classify grounded and resolve the movement and action states
4. integrate vertical, then lateral velocity (with steep-wall deflection while airborne)
5. move the body once, unless the character is dead
6. re-orient the body (camera-driven for players, toward the intent direction otherwise)

The controller owns its state exclusively; nothing here is shared across characters except the
read-only ground sensor.
*/

use std::sync::Arc;

use crate::{
    body::CharacterBody,
    constants::MAX_DT_S,
    error::LocomotionError,
    ground::{GroundProbe, GroundSensor},
    health::{CharacterHealth, HealthEvent},
    integrator::{
        Kinematics, LateralParams, VerticalStep, deflect_steep_wall, integrate_lateral,
        integrate_vertical,
    },
    intent::{ActionRequest, IntentContext, IntentSource, MovementIntent, MovementRequest},
    orientation::{OrientationController, approach_yaw},
    settings::CharacterSettings,
    state::{ActionState, CharacterState, HealthState, MovementState},
    state_machine::{MachineInput, MovementStateMachine, can_jump},
    types::{Quat, Vec3},
    utils::{forward, to_planar, yaw_from_xz, yaw_of},
};

/// What happened during one tick, for the animation bridge and other consumers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Body-local velocity components at the start of the tick (m/s).
    pub forward_speed: f32,
    pub lateral_speed: f32,
    pub vertical_speed: f32,
    pub state: CharacterState,
    pub previous_movement: MovementState,
    pub rotation_mismatch: f32,
    pub is_rotating_to_target: bool,
    pub grounded: bool,
    /// Velocity handed to the body, or that would have been when the move was skipped.
    pub velocity: Vec3,
    /// Whether the body was moved this tick.
    pub moved: bool,
    pub health_events: Vec<HealthEvent>,
}

impl TickReport {
    pub fn movement_changed(&self) -> bool {
        self.state.movement() != self.previous_movement
    }
}

pub struct CharacterControllerBuilder<I: IntentSource> {
    settings: CharacterSettings,
    body: Option<Box<dyn CharacterBody>>,
    sensor: Option<Arc<dyn GroundSensor>>,
    intent_source: Option<I>,
    camera: bool,
}

impl<I: IntentSource> CharacterControllerBuilder<I> {
    pub fn new(settings: CharacterSettings) -> Self {
        Self {
            settings,
            body: None,
            sensor: None,
            intent_source: None,
            camera: false,
        }
    }

    pub fn body(mut self, body: impl CharacterBody + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    pub fn ground_sensor(mut self, sensor: Arc<dyn GroundSensor>) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn intent_source(mut self, source: I) -> Self {
        self.intent_source = Some(source);
        self
    }

    /// Drive facing from a camera rig (player characters).
    pub fn with_camera(mut self) -> Self {
        self.camera = true;
        self
    }

    pub fn build(self) -> Result<CharacterController<I>, LocomotionError> {
        self.settings.validate()?;
        let body = self.body.ok_or(LocomotionError::MissingCollaborator("character body"))?;
        let sensor = self
            .sensor
            .ok_or(LocomotionError::MissingCollaborator("ground sensor"))?;
        let intent_source = self
            .intent_source
            .ok_or(LocomotionError::MissingCollaborator("intent source"))?;

        let settings = self.settings;
        let spawn_position = body.position();
        let spawn_rotation = body.rotation();
        let orientation = self
            .camera
            .then(|| OrientationController::new(settings.orientation.clone(), yaw_of(&spawn_rotation)));
        let probe = GroundProbe::new(
            settings.movement.ground_layers,
            settings.body.ground_probe_distance,
            settings.body.skin,
        );
        let health = CharacterHealth::new(settings.health.clone());

        log::info!(
            "character controller built at {:?} (camera: {})",
            spawn_position,
            orientation.is_some()
        );

        Ok(CharacterController {
            settings,
            state: CharacterState::default(),
            kinematics: Kinematics::new(),
            machine: MovementStateMachine::new(),
            probe,
            body,
            sensor,
            intent_source,
            orientation,
            health,
            spawn_position,
            spawn_rotation,
        })
    }
}

pub struct CharacterController<I: IntentSource> {
    settings: CharacterSettings,
    state: CharacterState,
    kinematics: Kinematics,
    machine: MovementStateMachine,
    probe: GroundProbe,
    body: Box<dyn CharacterBody>,
    sensor: Arc<dyn GroundSensor>,
    intent_source: I,
    orientation: Option<OrientationController>,
    health: CharacterHealth,
    spawn_position: Vec3,
    spawn_rotation: Quat,
}

impl<I: IntentSource> CharacterController<I> {
    pub fn builder(settings: CharacterSettings) -> CharacterControllerBuilder<I> {
        CharacterControllerBuilder::new(settings)
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn settings(&self) -> &CharacterSettings {
        &self.settings
    }

    pub fn body(&self) -> &dyn CharacterBody {
        self.body.as_ref()
    }

    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    pub fn health(&self) -> &CharacterHealth {
        &self.health
    }

    /// Damage and healing go through here; the resulting events are applied next tick.
    pub fn health_mut(&mut self) -> &mut CharacterHealth {
        &mut self.health
    }

    pub fn orientation(&self) -> Option<&OrientationController> {
        self.orientation.as_ref()
    }

    pub fn intent_source_mut(&mut self) -> &mut I {
        &mut self.intent_source
    }

    pub fn ground_normal(&self) -> Vec3 {
        self.probe.ground_normal()
    }

    /// Return to the spawn point with fresh state and full health.
    pub fn respawn(&mut self) {
        self.body.teleport(self.spawn_position);
        self.body.set_rotation(self.spawn_rotation);
        self.body.set_step_offset_enabled(true);
        self.state.reset();
        self.kinematics = Kinematics::new();
        self.machine.reset();
        self.probe.reset();
        self.health.reset();
        if let Some(orientation) = self.orientation.as_mut() {
            orientation.reset(yaw_of(&self.spawn_rotation));
        }
        log::info!("character respawned at {:?}", self.spawn_position);
    }

    pub fn tick(&mut self, dt: f32) -> TickReport {
        let previous_movement = self.state.movement();
        let Some(dt) = sanitize_dt(dt) else {
            return TickReport {
                state: self.state,
                previous_movement,
                ..TickReport::default()
            };
        };

        let (forward_speed, lateral_speed, vertical_speed) = self.local_speeds();

        let ctx = IntentContext {
            position: self.body.position(),
            rotation: self.body.rotation(),
            camera_yaw: self.orientation.as_ref().map(|o| o.camera_yaw()),
            state: self.state,
        };
        let intent = self.intent_source.next_intent(&ctx);

        self.health.advance(dt);
        let health_events = self.health.drain_events();
        self.apply_health_events(&health_events);

        self.kinematics.last_movement_state = previous_movement;
        let grounded = self.probe.is_grounded(
            self.state.in_grounded_state(),
            self.body.as_ref(),
            self.sensor.as_ref(),
        );

        if self.state.is_dead() {
            self.state.set_dead();
            self.machine.reset();
        } else {
            let input = MachineInput {
                grounded,
                body_velocity: self.body.velocity(),
                forward: forward(&self.body.rotation()),
                forward_speed,
                intent: &intent,
            };
            let next = self.machine.resolve(
                previous_movement,
                &mut self.kinematics,
                &input,
                &self.settings.movement,
                dt,
            );
            if next != previous_movement {
                log::debug!("movement {previous_movement:?} -> {next:?}");
            }
            self.state.set_movement(next);
            self.state.set_action(resolve_action(&intent, self.state.action()));
        }
        self.body
            .set_step_offset_enabled(self.kinematics.step_offset_active);

        self.integrate(&intent, grounded, previous_movement, dt);

        let moved = !self.state.is_dead();
        if moved {
            self.body.move_with_velocity(self.kinematics.velocity(), dt);
        }

        let (rotation_mismatch, is_rotating_to_target) = self.orient(&intent, dt);

        TickReport {
            forward_speed,
            lateral_speed,
            vertical_speed,
            state: self.state,
            previous_movement,
            rotation_mismatch,
            is_rotating_to_target,
            grounded,
            velocity: self.kinematics.velocity(),
            moved,
            health_events,
        }
    }

    fn local_speeds(&self) -> (f32, f32, f32) {
        let velocity = self.body.velocity();
        let local = self.body.rotation().inverse() * velocity;
        (local.z, local.x, velocity.y)
    }

    fn apply_health_events(&mut self, events: &[HealthEvent]) {
        for event in events {
            match event {
                HealthEvent::Gone => {
                    self.state.set_dead();
                    log::info!("character died");
                }
                HealthEvent::GoneDelayed => log::info!("character death delay elapsed"),
                _ => {}
            }
        }
        if !self.state.is_dead() && !events.is_empty() {
            let health = if self.health.is_full() {
                HealthState::Fine
            } else {
                HealthState::Injured
            };
            self.state.set_health(health);
        }
    }

    fn integrate(
        &mut self,
        intent: &MovementIntent,
        grounded: bool,
        previous_movement: MovementState,
        dt: f32,
    ) {
        let movement = &self.settings.movement;
        let current = self.state.movement();

        let jump = !self.state.is_dead()
            && intent.has(MovementRequest::Jump)
            && can_jump(grounded, current);
        let vertical = integrate_vertical(
            self.kinematics.vertical_velocity,
            dt,
            movement,
            VerticalStep {
                grounded,
                jump,
                was_grounded_state: previous_movement.is_grounded(),
            },
        );
        self.kinematics.vertical_velocity = vertical.velocity;
        if vertical.jumped {
            self.kinematics.jumped_last_frame = true;
            log::debug!("jump impulse applied, vertical velocity {}", vertical.velocity);
        }

        let direction = match self.machine.roll_vector() {
            Some(commit) if current == MovementState::Rolling => commit,
            _ => intent.direction,
        };
        let params = LateralParams::for_state(current, movement);
        let mut lateral = integrate_lateral(self.body.velocity(), direction, params, dt);

        if current.is_airborne() {
            let normal = self
                .probe
                .probe_normal(self.body.as_ref(), self.sensor.as_ref());
            lateral = deflect_steep_wall(
                lateral,
                normal,
                self.body.slope_limit_deg(),
                self.kinematics.vertical_velocity,
            );
        }
        self.kinematics.lateral_velocity = lateral;
    }

    /// Returns (rotation mismatch, rotating to target).
    fn orient(&mut self, intent: &MovementIntent, dt: f32) -> (f32, bool) {
        let rotation = self.body.rotation();
        if let Some(orientation) = self.orientation.as_mut() {
            let update = orientation.update(rotation, intent.look, &self.state, dt);
            self.body.set_rotation(update.rotation);
            return (update.rotation_mismatch, update.is_rotating_to_target);
        }

        // Without a camera the body faces where it is asked to go.
        if !self.state.is_dead() && self.state.movement() != MovementState::Rolling {
            if let Some(target) = yaw_from_xz(to_planar(&intent.direction)) {
                let rate = self.settings.orientation.model_rotation_speed;
                self.body
                    .set_rotation(approach_yaw(&rotation, target, rate, dt));
            }
        }
        (0.0, false)
    }
}

/// Attack wins; gathering continues or starts only when not attacking.
fn resolve_action(intent: &MovementIntent, current: ActionState) -> ActionState {
    match intent.action {
        ActionRequest::Attack => ActionState::Attacking,
        ActionRequest::Gather if current != ActionState::Attacking => ActionState::Gathering,
        _ => ActionState::None,
    }
}

fn sanitize_dt(dt: f32) -> Option<f32> {
    if !dt.is_finite() || dt <= 0.0 {
        log::warn!("ignoring tick with dt = {dt}");
        return None;
    }
    if dt > MAX_DT_S {
        log::warn!("clamping dt {dt} to {MAX_DT_S}");
        return Some(MAX_DT_S);
    }
    Some(dt)
}
