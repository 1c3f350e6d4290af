//! Trigger volumes that modify character health.

use serde::Deserialize;

use crate::{health::CharacterHealth, types::Vec3};

/// Region of space a zone covers.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneVolume {
    Sphere { center: [f32; 3], radius: f32 },
    Box { center: [f32; 3], half_extents: [f32; 3] },
}

impl ZoneVolume {
    pub fn contains(&self, p: Vec3) -> bool {
        match *self {
            ZoneVolume::Sphere { center, radius } => {
                (p - Vec3::from(center)).norm_squared() <= radius * radius
            }
            ZoneVolume::Box {
                center,
                half_extents,
            } => {
                let d = p - Vec3::from(center);
                d.x.abs() <= half_extents[0]
                    && d.y.abs() <= half_extents[1]
                    && d.z.abs() <= half_extents[2]
            }
        }
    }
}

/// Applies `modifier` when a character enters, and every `continuous_delay` seconds while it
/// stays inside if `continuous`. A `consume_on_apply` zone applies once and is then spent.
#[derive(Clone, Debug)]
pub struct HealthZone {
    pub volume: ZoneVolume,
    pub modifier: f32,
    pub continuous: bool,
    pub continuous_delay: f32,
    pub consume_on_apply: bool,
    occupied: bool,
    consumed: bool,
    delay_timer: f32,
}

impl HealthZone {
    pub fn new(volume: ZoneVolume, modifier: f32) -> Self {
        Self {
            volume,
            modifier,
            continuous: false,
            continuous_delay: 2.0,
            consume_on_apply: false,
            occupied: false,
            consumed: false,
            delay_timer: 0.0,
        }
    }

    pub fn continuous(mut self, delay: f32) -> Self {
        self.continuous = true;
        self.continuous_delay = delay.max(0.0);
        self
    }

    pub fn consumed_on_apply(mut self) -> Self {
        self.consume_on_apply = true;
        self
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn enter(&mut self, health: &mut CharacterHealth) {
        if self.consumed {
            return;
        }
        self.occupied = true;
        health.modify(self.modifier);
        if self.consume_on_apply {
            self.occupied = false;
            self.consumed = true;
        }
    }

    pub fn exit(&mut self) {
        self.occupied = false;
    }

    /// Detect enter/exit from `position` and apply continuous modification.
    pub fn update(&mut self, position: Vec3, dt: f32, health: &mut CharacterHealth) {
        if self.consumed {
            return;
        }
        let inside = self.volume.contains(position);
        if inside && !self.occupied {
            self.enter(health);
            return;
        }
        if !inside {
            if self.occupied {
                self.exit();
            }
            return;
        }

        if !self.continuous {
            return;
        }
        if self.delay_timer < self.continuous_delay {
            self.delay_timer += dt;
            return;
        }
        health.modify(self.modifier);
        self.delay_timer = 0.0;
    }
}
