//! Injectable time source.
//!
//! The engine never reads the wall clock directly; it goes through a [`Clock`]
//! so that tests can freeze (and advance) time deterministically instead of
//! racing real timeouts.

use std::time::{Duration, Instant};

/// A source of monotonic instants.
pub trait Clock {
    /// Return the current instant.
    fn now(&self) -> Instant;
}

/// The real system clock, backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only advances when told to, for deterministic tests of the
/// retransmission timer.
#[derive(Debug, Clone)]
pub struct FrozenClock {
    now: std::cell::Cell<Instant>,
}

impl FrozenClock {
    pub fn new() -> Self {
        Self { now: std::cell::Cell::new(Instant::now()) }
    }

    /// Advance the frozen instant by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get() + dt);
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
