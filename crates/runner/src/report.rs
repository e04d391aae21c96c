// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Result types returned by [`JobRunner::wait`] and [`JobRunner::stop`].
//!
//! [`JobRunner::wait`]: crate::JobRunner::wait
//! [`JobRunner::stop`]: crate::JobRunner::stop

use serde::{Deserialize, Serialize};

use volley_core::{Job, JobId, JobOutput, JobState};

/// Final (or latest, for jobs still in flight when a wait times out)
/// view of one job inside a [`WaitReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub id: JobId,
    /// Single-line rendering of the command (program + args)
    pub command: String,
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<JobOutput>,
    pub elapsed_ms: u64,
}

impl JobReport {
    pub(crate) fn from_job(job: &Job, now_ms: u64) -> Self {
        Self {
            id: job.id.clone(),
            command: job.command.line(),
            state: job.state,
            exit_code: job.exit_code,
            error: job.error.clone(),
            output: job.output.clone(),
            elapsed_ms: job.elapsed_ms(now_ms),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == JobState::Succeeded
    }
}

/// Everything a waiter learns when [`JobRunner::wait`] returns.
///
/// `jobs` holds one entry per requested id, in request order (insertion
/// order when the wait covered all jobs). Ids removed by a concurrent
/// cleanup are omitted.
///
/// [`JobRunner::wait`]: crate::JobRunner::wait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitReport {
    /// True when every requested job reached a terminal state; false means
    /// the wait timed out first and some entries are still live.
    pub completed: bool,
    pub jobs: Vec<JobReport>,
}

impl WaitReport {
    /// True when the wait completed and every job succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.completed && self.jobs.iter().all(JobReport::succeeded)
    }

    /// Jobs that did not (or have not yet) come out clean.
    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|j| !j.succeeded())
    }
}

/// Tally of what a [`JobRunner::stop`] call did.
///
/// [`JobRunner::stop`]: crate::JobRunner::stop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopReport {
    /// Running jobs whose process group was asked to terminate
    pub signalled: usize,
    /// Pending jobs cancelled before they ever started
    pub cancelled_pending: usize,
    /// Jobs that were already terminal and were left untouched
    pub already_terminal: usize,
}

impl StopReport {
    /// Number of jobs the stop actually affected.
    pub fn affected(&self) -> usize {
        self.signalled + self.cancelled_pending
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
