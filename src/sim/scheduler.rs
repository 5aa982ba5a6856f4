//! Single-threaded timer queue and frame clock
//!
//! Everything runs on one timeline: the host feeds elapsed time in through
//! [`Scheduler::advance`] once per frame and gets back the events that came
//! due. Timers never fire on their own, so a cancelled timer can never fire.

/// Handle for a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<E> {
    id: TimerId,
    due: f64,
    event: E,
}

/// Delayed-event queue driven by elapsed milliseconds
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now: f64,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// Scheduler time in ms (sum of everything passed to `advance`)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Queue `event` to fire once `delay_ms` more time has elapsed
    pub fn after_delay(&mut self, delay_ms: f64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay_ms.max(0.0),
            event,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Move time forward and return due events, earliest first
    /// (ties keep scheduling order).
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<E> {
        self.now += elapsed_ms.max(0.0);
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.due <= now);
        self.timers = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|t| t.event).collect()
    }
}

/// Converts display-refresh timestamps into elapsed milliseconds.
///
/// The first frame after a reset reports zero elapsed time so a pause never
/// turns into one huge jump.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn elapsed(&mut self, now_ms: f64) -> f64 {
        let elapsed = match self.last {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last = Some(now_ms);
        elapsed
    }
}
