//! Leading-edge throttle with a trailing catch-up call.
//!
//! The first call in a quiet period runs immediately. Calls arriving within
//! the window are coalesced into one pending run that [`Throttle::poll`]
//! releases once the window has elapsed, so the final scroll position of a
//! burst is always processed.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Throttle {
    delay: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_run: None,
            pending: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register a call at `now`. Returns true if it should run right away.
    pub fn call(&mut self, now: Instant) -> bool {
        if self.window_open(now) {
            self.last_run = Some(now);
            self.pending = false;
            true
        } else {
            // Supersedes any earlier pending call
            self.pending = true;
            false
        }
    }

    /// Returns true if a coalesced call is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.pending && self.window_open(now) {
            self.last_run = Some(now);
            self.pending = false;
            return true;
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Forget all history; the next call runs immediately.
    pub fn reset(&mut self) {
        self.last_run = None;
        self.pending = false;
    }

    fn window_open(&self, now: Instant) -> bool {
        match self.last_run {
            Some(last) => now.saturating_duration_since(last) >= self.delay,
            None => true,
        }
    }
}
