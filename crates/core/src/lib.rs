// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! volley-core: shared types for the volley job runner
//!
//! Job identifiers, the job record and its state machine, command
//! specifications, and the clock abstraction used for testable time.

pub mod macros;

pub mod clock;
pub mod id;
pub mod job;
pub mod time_fmt;

pub use clock::{Clock, ManualClock, SystemClock};
pub use id::short;
pub use job::{CommandSpec, Job, JobId, JobOutput, JobSnapshot, JobState};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
