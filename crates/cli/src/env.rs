// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Centralized environment variable access for the CLI.

use std::time::Duration;

/// How often the progress line repaints and the wait loop polls
/// (default 500ms, configurable via `VOLLEY_TICK_MS`). Floored at 10ms
/// so a bad override cannot spin the loop.
pub fn tick_interval() -> Duration {
    let ms = std::env::var("VOLLEY_TICK_MS").ok().and_then(|s| s.parse::<u64>().ok()).unwrap_or(500);
    Duration::from_millis(ms.max(10))
}

/// Grace period between the polite stop signal and the forced kill
/// (`VOLLEY_GRACE_MS`). The `--grace` flag wins when both are given.
pub fn grace_period() -> Option<Duration> {
    std::env::var("VOLLEY_GRACE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Per-stream captured-output cap override (`VOLLEY_MAX_OUTPUT_BYTES`).
pub fn max_output_bytes() -> Option<usize> {
    std::env::var("VOLLEY_MAX_OUTPUT_BYTES").ok().and_then(|s| s.parse::<usize>().ok())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
