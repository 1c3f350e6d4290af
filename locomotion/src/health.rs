use crate::{
    settings::HealthSettings,
    timer::{TimerHandle, TimerQueue},
};

/// Notifications raised by [`CharacterHealth`], drained by the owner each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HealthEvent {
    Changed { current: f32 },
    Decreased { amount: f32 },
    Increased { amount: f32 },
    /// Health reached zero. Raised once per life.
    Gone,
    /// Raised `health_gone_delay` seconds after [`HealthEvent::Gone`].
    GoneDelayed,
}

/// Hit points of one character.
///
/// Reaching zero raises `Gone` immediately and schedules `GoneDelayed` (typically used to
/// respawn or show a game-over screen). Dropping the component drops its pending timers.
#[derive(Clone, Debug)]
pub struct CharacterHealth {
    settings: HealthSettings,
    current: f32,
    gone: bool,
    timers: TimerQueue<HealthEvent>,
    gone_timer: Option<TimerHandle>,
    events: Vec<HealthEvent>,
}

impl CharacterHealth {
    pub fn new(settings: HealthSettings) -> Self {
        let current = settings.starting_health.min(settings.max_health);
        Self {
            settings,
            current,
            gone: false,
            timers: TimerQueue::new(),
            gone_timer: None,
            events: Vec::new(),
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.settings.max_health
    }

    pub fn is_gone(&self) -> bool {
        self.gone
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.settings.max_health
    }

    /// Positive amounts heal, anything else damages.
    pub fn modify(&mut self, amount: f32) {
        if amount > 0.0 {
            self.increase(amount);
        } else {
            self.decrease(-amount);
        }
    }

    pub fn decrease(&mut self, amount: f32) {
        let amount = amount.abs();
        self.current -= amount;
        self.events.push(HealthEvent::Decreased { amount });
        self.changed();
    }

    /// Heal, never above max health.
    pub fn increase(&mut self, amount: f32) {
        let amount = amount.abs();
        self.current = (self.current + amount).min(self.settings.max_health);
        self.events.push(HealthEvent::Increased { amount });
        self.changed();
    }

    /// Back to starting health; a pending delayed event is cancelled.
    pub fn reset(&mut self) {
        if let Some(handle) = self.gone_timer.take() {
            self.timers.cancel(handle);
        }
        self.current = self.settings.starting_health.min(self.settings.max_health);
        self.gone = false;
        self.events.clear();
    }

    /// Run pending timers.
    pub fn advance(&mut self, dt: f32) {
        for event in self.timers.advance(dt) {
            if event == HealthEvent::GoneDelayed {
                self.gone_timer = None;
                log::info!("health gone delay elapsed");
            }
            self.events.push(event);
        }
    }

    pub fn drain_events(&mut self) -> Vec<HealthEvent> {
        std::mem::take(&mut self.events)
    }

    fn changed(&mut self) {
        if self.current <= 0.0 && !self.gone {
            self.gone = true;
            log::info!("health gone");
            self.events.push(HealthEvent::Gone);
            self.gone_timer = Some(
                self.timers
                    .schedule(self.settings.health_gone_delay, HealthEvent::GoneDelayed),
            );
        }
        self.events.push(HealthEvent::Changed {
            current: self.current,
        });
    }
}
