//! Animation parameter bridge.
//!
//! Each semantic parameter maps to an opaque channel id: the 32-bit FNV-1a hash of its name,
//! computed at compile time. A host animation system keys its parameters by the same ids.

use serde::Deserialize;

use crate::{
    controller::TickReport,
    state::{ActionState, HealthState, MovementState},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Stable id for a parameter name.
pub const fn channel_id(name: &str) -> ChannelId {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    ChannelId(hash)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationParam {
    ForwardSpeed,
    LateralSpeed,
    VerticalSpeed,
    IsIdling,
    IsGrounded,
    IsFalling,
    IsJumping,
    IsRolling,
    IsCrouched,
    IsAttacking,
    IsGathering,
    IsPlayingAction,
    IsInjured,
    IsDead,
    IsRotatingToTarget,
    RotationMismatch,
}

impl AnimationParam {
    pub const ALL: [AnimationParam; 16] = [
        Self::ForwardSpeed,
        Self::LateralSpeed,
        Self::VerticalSpeed,
        Self::IsIdling,
        Self::IsGrounded,
        Self::IsFalling,
        Self::IsJumping,
        Self::IsRolling,
        Self::IsCrouched,
        Self::IsAttacking,
        Self::IsGathering,
        Self::IsPlayingAction,
        Self::IsInjured,
        Self::IsDead,
        Self::IsRotatingToTarget,
        Self::RotationMismatch,
    ];

    /// Channel ids in declaration order, hashed once at compile time.
    pub const CHANNELS: [ChannelId; 16] = {
        let mut ids = [ChannelId(0); 16];
        let mut i = 0;
        while i < Self::ALL.len() {
            ids[i] = channel_id(Self::ALL[i].name());
            i += 1;
        }
        ids
    };

    pub const fn name(self) -> &'static str {
        match self {
            Self::ForwardSpeed => "ForwardSpeed",
            Self::LateralSpeed => "LateralSpeed",
            Self::VerticalSpeed => "VerticalSpeed",
            Self::IsIdling => "IsIdling",
            Self::IsGrounded => "IsGrounded",
            Self::IsFalling => "IsFalling",
            Self::IsJumping => "IsJumping",
            Self::IsRolling => "IsRolling",
            Self::IsCrouched => "IsCrouched",
            Self::IsAttacking => "IsAttacking",
            Self::IsGathering => "IsGathering",
            Self::IsPlayingAction => "IsPlayingAction",
            Self::IsInjured => "IsInjured",
            Self::IsDead => "IsDead",
            Self::IsRotatingToTarget => "IsRotatingToTarget",
            Self::RotationMismatch => "RotationMismatch",
        }
    }

    pub const fn channel(self) -> ChannelId {
        Self::CHANNELS[self as usize]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Bool(bool),
}

/// All parameter values for one tick, in [`AnimationParam::ALL`] order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationFrame {
    pub values: Vec<(ChannelId, ParamValue)>,
}

impl AnimationFrame {
    pub fn get(&self, param: AnimationParam) -> Option<ParamValue> {
        let id = param.channel();
        self.values.iter().find(|(c, _)| *c == id).map(|(_, v)| *v)
    }

    pub fn float(&self, param: AnimationParam) -> Option<f32> {
        match self.get(param)? {
            ParamValue::Float(v) => Some(v),
            ParamValue::Bool(_) => None,
        }
    }

    pub fn flag(&self, param: AnimationParam) -> Option<bool> {
        match self.get(param)? {
            ParamValue::Bool(b) => Some(b),
            ParamValue::Float(_) => None,
        }
    }
}

/// Blend rates for the speed parameters (1/s).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub forward_smoothing: f32,
    pub lateral_smoothing: f32,
    pub vertical_smoothing: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            forward_smoothing: 4.0,
            lateral_smoothing: 10.0,
            vertical_smoothing: 4.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnimationBridge {
    settings: AnimationSettings,
    forward: f32,
    lateral: f32,
    vertical: f32,
}

#[inline]
fn blend(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).clamp(0.0, 1.0)
}

impl AnimationBridge {
    pub fn new(settings: AnimationSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn update(&mut self, report: &TickReport, dt: f32) -> AnimationFrame {
        let s = &self.settings;
        self.forward = blend(self.forward, report.forward_speed, s.forward_smoothing, dt);
        self.lateral = blend(self.lateral, report.lateral_speed, s.lateral_smoothing, dt);
        self.vertical = blend(self.vertical, report.vertical_speed, s.vertical_smoothing, dt);

        let state = &report.state;
        let movement = state.movement();
        let action = state.action();

        let values = AnimationParam::ALL
            .iter()
            .map(|&param| {
                let value = match param {
                    AnimationParam::ForwardSpeed => ParamValue::Float(self.forward),
                    AnimationParam::LateralSpeed => ParamValue::Float(self.lateral),
                    AnimationParam::VerticalSpeed => ParamValue::Float(self.vertical),
                    AnimationParam::RotationMismatch => {
                        ParamValue::Float(report.rotation_mismatch)
                    }
                    AnimationParam::IsIdling => ParamValue::Bool(movement == MovementState::Idling),
                    AnimationParam::IsGrounded => ParamValue::Bool(movement.is_grounded()),
                    AnimationParam::IsFalling => ParamValue::Bool(movement == MovementState::Falling),
                    AnimationParam::IsJumping => ParamValue::Bool(movement == MovementState::Jumping),
                    AnimationParam::IsRolling => ParamValue::Bool(movement == MovementState::Rolling),
                    AnimationParam::IsCrouched => {
                        ParamValue::Bool(movement == MovementState::Crouching)
                    }
                    AnimationParam::IsAttacking => ParamValue::Bool(action == ActionState::Attacking),
                    AnimationParam::IsGathering => ParamValue::Bool(action == ActionState::Gathering),
                    AnimationParam::IsPlayingAction => ParamValue::Bool(action != ActionState::None),
                    AnimationParam::IsInjured => {
                        ParamValue::Bool(state.health() == HealthState::Injured)
                    }
                    AnimationParam::IsDead => ParamValue::Bool(state.is_dead()),
                    AnimationParam::IsRotatingToTarget => {
                        ParamValue::Bool(report.is_rotating_to_target)
                    }
                };
                (param.channel(), value)
            })
            .collect();

        AnimationFrame { values }
    }
}
