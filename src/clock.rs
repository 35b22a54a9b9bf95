//! Clock abstraction for the timed read loop
//!
//! The read loop's deadline is measured through this trait so tests can
//! drive it without real wall-clock waits.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Time source used by deadline-bounded loops.
///
/// Only ever used as a generic bound, never as a trait object, so the
/// futures need no auto-trait bounds.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Yield the current flow for roughly `duration`.
    async fn yield_for(&self, duration: Duration);
}

/// Wall-clock implementation backed by the runtime timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn yield_for(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Deterministic clock: `yield_for` advances time instead of sleeping.
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Cell::new(Instant::now()),
        }
    }

    /// Advance the clock without going through `yield_for`.
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    async fn yield_for(&self, duration: Duration) {
        self.advance(duration);
    }
}
