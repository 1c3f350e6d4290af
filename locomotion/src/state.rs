//! Discrete character state.
//!
//! A character is in exactly one movement state, one action state and one health state at a
//! time. Only the controller mutates these; everything else reads them.

/// Locomotion state resolved by the state machine every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MovementState {
    #[default]
    Idling,
    Walking,
    Running,
    Sprinting,
    Jumping,
    Falling,
    Strafing,
    Rolling,
    Crouching,
}

impl MovementState {
    /// Whether the character is supported by ground in this state.
    #[inline]
    pub fn is_grounded(self) -> bool {
        matches!(
            self,
            Self::Idling
                | Self::Walking
                | Self::Running
                | Self::Sprinting
                | Self::Rolling
                | Self::Crouching
        )
    }

    #[inline]
    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Jumping | Self::Falling)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActionState {
    #[default]
    None,
    Attacking,
    Gathering,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HealthState {
    #[default]
    Fine,
    Injured,
    Dead,
}

/// Current movement, action and health state of one character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharacterState {
    movement: MovementState,
    action: ActionState,
    health: HealthState,
}

impl CharacterState {
    #[inline]
    pub fn movement(&self) -> MovementState {
        self.movement
    }

    #[inline]
    pub fn action(&self) -> ActionState {
        self.action
    }

    #[inline]
    pub fn health(&self) -> HealthState {
        self.health
    }

    /// Back to Idling / None / Fine.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_movement(&mut self, movement: MovementState) {
        self.movement = movement;
    }

    pub fn set_action(&mut self, action: ActionState) {
        self.action = action;
    }

    /// Set the health state. Entering `Dead` also neutralizes movement and action.
    pub fn set_health(&mut self, health: HealthState) {
        if health == HealthState::Dead {
            self.set_dead();
        } else {
            self.health = health;
        }
    }

    pub fn set_dead(&mut self) {
        self.movement = MovementState::Idling;
        self.action = ActionState::None;
        self.health = HealthState::Dead;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health == HealthState::Dead
    }

    #[inline]
    pub fn in_grounded_state(&self) -> bool {
        self.movement.is_grounded()
    }

    #[inline]
    pub fn is(&self, movement: MovementState) -> bool {
        self.movement == movement
    }
}
