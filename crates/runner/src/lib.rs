// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! volley-runner: a concurrent external-command job runner.
//!
//! Submit argument-vector commands, get back job ids, then poll
//! [`JobRunner::status`], block on [`JobRunner::wait`], cancel with
//! [`JobRunner::stop`], and drop finished records with
//! [`JobRunner::cleanup`]. Each job runs as its own OS process driven by a
//! spawned task; the runner coordinates but never schedules. Concurrency is
//! unbounded unless [`RunnerConfig::max_parallel`] caps it.
//!
//! ```no_run
//! # async fn demo() -> Result<(), volley_runner::RunnerError> {
//! use volley_core::CommandSpec;
//! use volley_runner::{JobRunner, RunnerConfig};
//!
//! let runner = JobRunner::new(RunnerConfig::new());
//! let id = runner.submit(CommandSpec::new("make").arg("check"))?;
//! let report = runner.wait(Some(&[id]), None).await?;
//! assert!(report.completed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod exec;
pub mod report;
pub mod runner;
mod table;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use report::{JobReport, StopReport, WaitReport};
pub use runner::JobRunner;
