//! End-to-end runs of the controller against Rapier static geometry.

use std::sync::Arc;

use locomotion::{
    AgentIntentSource, AnimationBridge, AnimationParam, CharacterController, CharacterSettings,
    ColliderShapeDef, KinematicBody, MovementRequest, MovementState, StaticColliderDef,
    StaticWorld, Vec3, rapier_world::tilt_about_z,
};

const DT: f32 = 1.0 / 60.0;

fn floor() -> StaticColliderDef {
    StaticColliderDef::new(
        0,
        Vec3::zeros(),
        ColliderShapeDef::Plane {
            offset_along_normal: 0.0,
        },
    )
}

fn agent_in(
    world: Vec<StaticColliderDef>,
    settings: CharacterSettings,
    feet: Vec3,
    target: Vec3,
) -> CharacterController<AgentIntentSource> {
    let world = Arc::new(StaticWorld::build(world));
    let body = KinematicBody::standing_at(world.clone(), &settings.body, feet);
    let mut agent = AgentIntentSource::new(0.2);
    agent.set_target(Some(target));

    CharacterController::builder(settings)
        .body(body)
        .ground_sensor(world)
        .intent_source(agent)
        .build()
        .unwrap()
}

#[test]
fn runs_across_flat_ground() {
    let mut ctl = agent_in(
        vec![floor()],
        CharacterSettings::default(),
        Vec3::zeros(),
        Vec3::new(0.0, 0.0, 50.0),
    );
    let start = ctl.position();
    let mut bridge = AnimationBridge::default();

    let mut reached_running = false;
    for _ in 0..120 {
        let report = ctl.tick(DT);
        assert!(report.state.movement().is_grounded(), "{:?}", report.state);
        reached_running |= report.state.movement() == MovementState::Running;
        let frame = bridge.update(&report, DT);
        assert_eq!(frame.flag(AnimationParam::IsGrounded), Some(true));
    }

    let end = ctl.position();
    assert!(reached_running);
    assert!(end.z - start.z > 3.0, "moved {:?}", end - start);
    assert!((end.y - start.y).abs() < 0.05);
    assert!(end.x.abs() < 1.0e-3);
}

#[test]
fn jump_leaves_and_returns_to_the_ground() {
    let mut ctl = agent_in(
        vec![floor()],
        CharacterSettings::default(),
        Vec3::zeros(),
        Vec3::zeros(),
    );
    let ground_y = ctl.position().y;
    for _ in 0..10 {
        ctl.tick(DT);
    }

    ctl.intent_source_mut().request(MovementRequest::Jump);
    ctl.tick(DT);
    assert!(ctl.kinematics().jumped_last_frame);

    let mut apex = ground_y;
    let mut states = Vec::new();
    for _ in 0..120 {
        let report = ctl.tick(DT);
        apex = apex.max(ctl.position().y);
        if states.last() != Some(&report.state.movement()) {
            states.push(report.state.movement());
        }
    }

    assert_eq!(
        &states[..3],
        &[
            MovementState::Jumping,
            MovementState::Falling,
            MovementState::Idling
        ]
    );
    // v0^2 / 2g = 60 / 50
    assert!((apex - ground_y - 1.2).abs() < 0.15, "apex {}", apex - ground_y);
    assert!((ctl.position().y - ground_y).abs() < 0.05);
}

#[test]
fn walking_off_a_ledge_falls_and_lands() {
    let platform = StaticColliderDef::new(
        1,
        Vec3::new(0.0, 0.5, 0.0),
        ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(2.0, 0.5, 2.0),
        },
    );
    let mut ctl = agent_in(
        vec![floor(), platform],
        CharacterSettings::default(),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 6.0),
    );

    let mut saw_falling = false;
    for _ in 0..240 {
        let report = ctl.tick(DT);
        saw_falling |= report.state.movement() == MovementState::Falling;
    }

    assert!(saw_falling);
    assert!(ctl.state().in_grounded_state());
    let capsule = ctl.body().capsule();
    let feet = ctl.position().y - capsule.center_to_feet();
    assert!(feet.abs() < 0.05, "feet at {feet}");
    assert!(ctl.position().z > 2.5);
}

#[test]
fn steep_ramp_is_not_climbed() {
    let ramp = StaticColliderDef::new(
        1,
        Vec3::new(2.0, 0.0, 0.0),
        ColliderShapeDef::Plane {
            offset_along_normal: 0.0,
        },
    )
    .rotated(tilt_about_z(60.0));

    let mut settings = CharacterSettings::default();
    settings.body.step_offset = 0.0;
    let mut ctl = agent_in(
        vec![floor(), ramp],
        settings,
        Vec3::zeros(),
        Vec3::new(10.0, 0.0, 0.0),
    );
    let start = ctl.position();

    for _ in 0..180 {
        ctl.tick(DT);
    }

    let end = ctl.position();
    assert!(end.x < 2.5, "climbed to {end:?}");
    assert!(end.y - start.y < 0.35, "climbed to {end:?}");
}
