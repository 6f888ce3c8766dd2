//! Poll-driven debounce for autosave notifications.
//!
//! The engine records every committed change; the host calls
//! [`Debouncer::poll`] from whatever timer it already has. A burst of changes
//! fires once, `delay` after the last of them.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_change: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_change: None,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }

    /// When the pending change becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_change.map(|t| t + self.delay)
    }

    /// Returns `true` once per burst, when `now` is at or past the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }
}
