//! Third-person character locomotion.
//!
//! A [`CharacterController`] turns a per-tick [`MovementIntent`] into movement of a
//! [`CharacterBody`]: it classifies grounded, resolves the movement/action/health state,
//! integrates velocity, moves the body once and re-orients it. [`AnimationBridge`] turns the
//! resulting [`TickReport`] into animation parameters.
//!
//! Physics is reached only through two seams, [`CharacterBody`] and [`GroundSensor`]; the
//! Rapier-backed implementations live in [`kinematic`] and [`rapier_world`].

// Re-export Rapier so hosts can author worlds without depending on it directly.
pub use rapier3d;

pub mod animation;
pub mod bitmask_flags;
pub mod body;
pub mod constants;
pub mod controller;
pub mod error;
pub mod ground;
pub mod health;
pub mod integrator;
pub mod intent;
pub mod kinematic;
pub mod orientation;
pub mod rapier_world;
pub mod settings;
pub mod state;
pub mod state_machine;
pub mod timer;
pub mod types;
pub mod utils;
pub mod zone;

#[cfg(test)]
mod test_support;

pub use animation::{AnimationBridge, AnimationFrame, AnimationParam, ChannelId, ParamValue};
pub use body::CharacterBody;
pub use controller::{CharacterController, CharacterControllerBuilder, TickReport};
pub use error::LocomotionError;
pub use ground::{GroundProbe, GroundSensor};
pub use health::{CharacterHealth, HealthEvent};
pub use intent::{
    ActionRequest, AgentIntentSource, Gait, InputDevice, IntentContext, IntentSource,
    LookInput, MovementIntent, MovementRequest, PlayerIntentSource,
};
pub use kinematic::KinematicBody;
pub use orientation::OrientationController;
pub use rapier_world::{ColliderShapeDef, StaticColliderDef, StaticWorld};
pub use settings::{
    BodySettings, CharacterSettings, HealthSettings, JumpImpulse, MovementSettings,
    OrientationSettings,
};
pub use state::{ActionState, CharacterState, HealthState, MovementState};
pub use timer::{TimerHandle, TimerQueue};
pub use types::{CapsuleSpec, LayerMask, Quat, SurfaceHit, Vec2, Vec3};
pub use zone::{HealthZone, ZoneVolume};
