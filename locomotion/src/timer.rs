//! Deferred single-shot events on the simulation tick.
//!
//! Each scheduled event gets a monotonically increasing id, the same shape as a scheduled
//! timer row keyed by an auto-incremented `scheduled_id`. Cancelling deletes the entry; the
//! owner cancels everything it scheduled when it is destroyed.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct ScheduledEvent<E> {
    scheduled_id: u64,
    remaining: f32,
    event: E,
}

#[derive(Clone, Debug)]
pub struct TimerQueue<E> {
    next_id: u64,
    scheduled: Vec<ScheduledEvent<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            scheduled: Vec::new(),
        }
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `event` once `delay` seconds of ticks have elapsed. Negative delays fire on the next
    /// advance.
    pub fn schedule(&mut self, delay: f32, event: E) -> TimerHandle {
        let scheduled_id = self.next_id;
        self.next_id += 1;
        self.scheduled.push(ScheduledEvent {
            scheduled_id,
            remaining: delay.max(0.0),
            event,
        });
        TimerHandle(scheduled_id)
    }

    /// Returns whether the event was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.scheduled.len();
        self.scheduled.retain(|s| s.scheduled_id != handle.0);
        self.scheduled.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.scheduled.clear();
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }

    /// Advance time by `dt` and return the events that came due, earliest deadline first.
    /// Events due at the same time fire in scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<E> {
        let dt = dt.max(0.0);
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.scheduled.len());

        for mut s in self.scheduled.drain(..) {
            s.remaining -= dt;
            if s.remaining <= 0.0 {
                due.push(s);
            } else {
                pending.push(s);
            }
        }
        self.scheduled = pending;

        due.sort_by(|a, b| {
            a.remaining
                .total_cmp(&b.remaining)
                .then(a.scheduled_id.cmp(&b.scheduled_id))
        });
        due.into_iter().map(|s| s.event).collect()
    }
}
