// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Errors surfaced synchronously by runner operations.
//!
//! Per-job failures (spawn errors, non-zero exits, forced kills) are not
//! errors here; they land on the job record and come back through wait
//! reports. Only invalid input is an `Err`.

use volley_core::JobId;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Submission rejected before any job was created.
    #[error("empty command: nothing to execute")]
    EmptyCommand,

    /// An operation referenced an id that is not in the table.
    #[error("unknown job id: {0}")]
    UnknownJob(JobId),
}
