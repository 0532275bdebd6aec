use std::time::{Duration, Instant};

/// Lets at most one value through per `min_interval`.
///
/// Values offered too early are held back; a newer one replaces the held
/// value, so the next allowed tick always delivers the latest.
#[derive(Debug)]
pub struct Throttle<T> {
    min_interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_emit: None,
            pending: None,
        }
    }

    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.ready(now) {
            self.pending = None;
            self.last_emit = Some(now);
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Releases the held value if its tick has come.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.ready(now) {
            self.last_emit = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.last_emit = None;
        self.pending = None;
    }

    fn ready(&self, now: Instant) -> bool {
        match self.last_emit {
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
            None => true,
        }
    }
}
