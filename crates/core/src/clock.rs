// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Clock abstraction for testable time handling

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Hand-advanced clock for tests; time moves only via [`ManualClock::advance`].
#[derive(Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

struct ManualState {
    now: Instant,
    epoch_ms: u64,
}

impl ManualClock {
    /// Start at the current instant with an arbitrary fixed epoch.
    pub fn new() -> Self {
        Self::starting_at(1_700_000_000_000)
    }

    /// Start at the current instant with the given epoch milliseconds.
    pub fn starting_at(epoch_ms: u64) -> Self {
        Self { state: Arc::new(Mutex::new(ManualState { now: Instant::now(), epoch_ms })) }
    }

    /// Advance both the instant and epoch views by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.now += duration;
        state.epoch_ms += duration.as_millis() as u64;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.state.lock().now
    }

    fn epoch_ms(&self) -> u64 {
        self.state.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
