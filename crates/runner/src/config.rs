// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Runner configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::exec::{DEFAULT_GRACE_PERIOD, DEFAULT_MAX_OUTPUT_BYTES};

/// Tuning knobs for a [`JobRunner`](crate::JobRunner).
///
/// Defaults mirror the unmanaged fire-and-forget model: unbounded
/// concurrency, no per-job deadline, a 2s stop grace period, and a 1 MiB
/// capture cap per output stream.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Cap on concurrently running jobs; `None` means unbounded. Excess
    /// submissions queue and start in submission order.
    pub max_parallel: Option<NonZeroUsize>,
    /// Time between the termination signal and the forced kill.
    pub grace_period: Duration,
    /// Deadline applied to every job that has no per-command timeout.
    pub job_timeout: Option<Duration>,
    /// Byte cap for each captured stream; overflow keeps the tail.
    pub max_output_bytes: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_parallel: None,
            grace_period: DEFAULT_GRACE_PERIOD,
            job_timeout: None,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    volley_core::setters! {
        set {
            grace_period: Duration,
            max_output_bytes: usize,
        }
        option {
            max_parallel: NonZeroUsize,
            job_timeout: Duration,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
