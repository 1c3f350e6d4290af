//! Scripted scenarios: a fixed test level plus per-tick input scripts.

use std::sync::Arc;

use clap::ValueEnum;
use locomotion::{
    AgentIntentSource, CharacterController, CharacterSettings, ColliderShapeDef, HealthEvent,
    HealthZone, InputDevice, IntentSource, KinematicBody, LayerMask, LocomotionError,
    MovementState, PlayerIntentSource, StaticColliderDef, StaticWorld, Vec2, Vec3, ZoneVolume,
    rapier_world::tilt_about_z,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Run forward across flat ground.
    Run,
    /// Jump in place every second.
    Jump,
    /// Run off a raised platform.
    Ledge,
    /// Run into a ramp steeper than the slope limit.
    Slope,
    /// An agent walks a square of waypoints.
    Agent,
    /// Run into a damaging zone, die, respawn.
    Hazard,
}

const PLATFORM_TOP: f32 = 1.5;
const HAZARD_CENTER: [f32; 3] = [-8.0, 1.0, 0.0];
const HAZARD_HALF_EXTENTS: [f32; 3] = [4.0, 1.0, 1.5];

/// Ground plane, a raised platform ahead (+Z), a 50 degree ramp to the right (+X) and a hazard
/// trigger to the left (-X).
pub fn level() -> Vec<StaticColliderDef> {
    vec![
        StaticColliderDef::new(
            0,
            Vec3::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        ),
        StaticColliderDef::new(
            1,
            Vec3::new(0.0, PLATFORM_TOP * 0.5, 8.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(3.0, PLATFORM_TOP * 0.5, 3.0),
            },
        ),
        StaticColliderDef::new(
            2,
            Vec3::new(8.0, 1.5, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(3.0, 0.1, 3.0),
            },
        )
        .rotated(tilt_about_z(50.0)),
        StaticColliderDef::new(
            3,
            Vec3::from(HAZARD_CENTER),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::from(HAZARD_HALF_EXTENTS),
            },
        )
        .on_layers(LayerMask::NONE)
        .trigger(),
    ]
}

/// Where the scenario's character starts, feet position.
fn spawn_feet(scenario: Scenario) -> Vec3 {
    match scenario {
        Scenario::Ledge => Vec3::new(0.0, PLATFORM_TOP, 8.0),
        _ => Vec3::zeros(),
    }
}

/// Camera yaw the player script looks toward, degrees.
fn heading(scenario: Scenario) -> f32 {
    match scenario {
        Scenario::Slope => 90.0,
        Scenario::Hazard => -90.0,
        _ => 0.0,
    }
}

#[derive(Debug, Default)]
pub struct Summary {
    pub ticks: u64,
    pub transitions: usize,
    pub deaths: usize,
    pub respawns: usize,
    pub start: Vec3,
    pub end: Vec3,
    pub final_state: MovementState,
}

pub fn run(
    scenario: Scenario,
    settings: CharacterSettings,
    ticks: u64,
    dt: f32,
) -> Result<Summary, LocomotionError> {
    let world = Arc::new(StaticWorld::build(level()));
    let body = KinematicBody::standing_at(world.clone(), &settings.body, spawn_feet(scenario));

    if scenario == Scenario::Agent {
        let mut agent = AgentIntentSource::new(0.25);
        agent.set_target(Some(Vec3::from(WAYPOINTS[0])));
        let ctl = CharacterController::builder(settings)
            .body(body)
            .ground_sensor(world)
            .intent_source(agent)
            .build()?;
        let mut next = 1;
        return Ok(drive(ctl, ticks, dt, None, move |agent: &mut AgentIntentSource, _| {
            if agent.target().is_none() && next < WAYPOINTS.len() {
                log::info!("agent heading to waypoint {next}");
                agent.set_target(Some(Vec3::from(WAYPOINTS[next])));
                next += 1;
            }
        }));
    }

    let ctl = CharacterController::builder(settings)
        .body(body)
        .ground_sensor(world)
        .intent_source(PlayerIntentSource::new())
        .with_camera()
        .build()?;

    let zone = (scenario == Scenario::Hazard).then(|| {
        HealthZone::new(
            ZoneVolume::Box {
                center: HAZARD_CENTER,
                half_extents: HAZARD_HALF_EXTENTS,
            },
            -40.0,
        )
        .continuous(0.5)
    });

    let yaw = heading(scenario);
    Ok(drive(ctl, ticks, dt, zone, move |input, tick| {
        player_script(scenario, yaw, input, tick)
    }))
}

/// `tick` counts from the latest spawn, so the heading is re-applied after a respawn resets the
/// camera.
fn player_script(scenario: Scenario, yaw: f32, input: &mut PlayerIntentSource, tick: u64) {
    if tick == 0 && yaw != 0.0 {
        // look_sense_h defaults to 0.1 degrees per unit.
        input.add_look_input(Vec2::new(yaw * 10.0, 0.0), InputDevice::KeyboardMouse);
    }
    match scenario {
        Scenario::Jump => {
            if tick % 60 == 30 {
                input.press_jump();
            }
        }
        _ => input.set_move_input(Vec2::new(0.0, 1.0)),
    }
}

const WAYPOINTS: [[f32; 3]; 4] = [
    [4.0, 0.0, 0.0],
    [4.0, 0.0, -4.0],
    [0.0, 0.0, -4.0],
    [0.0, 0.0, 0.0],
];

fn drive<I: IntentSource>(
    mut ctl: CharacterController<I>,
    ticks: u64,
    dt: f32,
    mut zone: Option<HealthZone>,
    mut script: impl FnMut(&mut I, u64),
) -> Summary {
    let mut summary = Summary {
        start: ctl.position(),
        ..Summary::default()
    };
    let mut spawned_at = 0;

    for tick in 0..ticks {
        script(ctl.intent_source_mut(), tick - spawned_at);
        if let Some(zone) = zone.as_mut() {
            let position = ctl.position();
            zone.update(position, dt, ctl.health_mut());
        }

        let report = ctl.tick(dt);

        if report.movement_changed() {
            summary.transitions += 1;
            log::info!(
                "tick {tick}: {:?} -> {:?} at ({:.2}, {:.2}, {:.2})",
                report.previous_movement,
                report.state.movement(),
                ctl.position().x,
                ctl.position().y,
                ctl.position().z,
            );
        }

        for event in &report.health_events {
            match event {
                HealthEvent::Gone => {
                    summary.deaths += 1;
                    log::warn!("tick {tick}: character died");
                }
                HealthEvent::GoneDelayed => {
                    ctl.respawn();
                    if let Some(zone) = zone.as_mut() {
                        zone.exit();
                    }
                    spawned_at = tick + 1;
                    summary.respawns += 1;
                }
                HealthEvent::Decreased { amount } => {
                    log::info!("tick {tick}: took {amount} damage, {} left", ctl.health().current())
                }
                _ => {}
            }
        }
    }

    summary.ticks = ticks;
    summary.end = ctl.position();
    summary.final_state = ctl.state().movement();
    summary
}
