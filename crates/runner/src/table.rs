// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! The job table: insertion-ordered job records plus per-job control
//! handles. All access happens under the runner's single mutex; methods
//! here never block and never touch the outside world.

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use volley_core::{Job, JobId, JobOutput, JobSnapshot, JobState};

/// One table entry: the job record and the handle used to stop it.
#[derive(Debug)]
pub(crate) struct JobEntry {
    pub(crate) job: Job,
    /// Cancelled by `stop`; observed by the driving task.
    pub(crate) cancel: CancellationToken,
}

/// Terminal result applied to a job in one critical section, so readers
/// never see a terminal state without its exit code, error, and output.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) state: JobState,
    pub(crate) exit_code: Option<i32>,
    pub(crate) error: Option<String>,
    pub(crate) output: Option<JobOutput>,
}

impl Outcome {
    pub(crate) fn succeeded(output: JobOutput) -> Self {
        Self { state: JobState::Succeeded, exit_code: Some(0), error: None, output: Some(output) }
    }

    pub(crate) fn failed(exit_code: i32, output: JobOutput) -> Self {
        Self {
            state: JobState::Failed,
            exit_code: Some(exit_code),
            error: None,
            output: Some(output),
        }
    }

    /// The command never started; `error` explains why, and there is no
    /// exit code or output.
    pub(crate) fn spawn_failed(program: &str, err: &std::io::Error) -> Self {
        Self {
            state: JobState::Failed,
            exit_code: None,
            error: Some(format!("failed to start {}: {}", program, err)),
            output: None,
        }
    }

    /// Killed by a signal the runner did not send.
    pub(crate) fn signalled(signal: i32, output: JobOutput) -> Self {
        Self {
            state: JobState::Failed,
            exit_code: None,
            error: Some(format!("terminated by signal {}", signal)),
            output: Some(output),
        }
    }

    pub(crate) fn cancelled(output: Option<JobOutput>, forced: bool) -> Self {
        Self {
            state: JobState::Cancelled,
            exit_code: None,
            error: forced.then(|| "graceful stop timed out; killed".to_string()),
            output,
        }
    }

    pub(crate) fn timed_out(output: JobOutput, forced: bool) -> Self {
        Self {
            state: JobState::TimedOut,
            exit_code: None,
            error: forced.then(|| "deadline kill timed out; killed".to_string()),
            output: Some(output),
        }
    }
}

/// Insertion-ordered map of all jobs the runner knows about.
#[derive(Debug, Default)]
pub(crate) struct JobTable {
    entries: IndexMap<JobId, JobEntry>,
}

impl JobTable {
    /// Insert a freshly submitted job; returns the token its driver watches.
    ///
    /// Ids are random, so a collision would be a bug; the existing entry is
    /// never displaced.
    pub(crate) fn insert(&mut self, job: Job) -> CancellationToken {
        let cancel = CancellationToken::new();
        let id = job.id.clone();
        self.entries.entry(id).or_insert(JobEntry { job, cancel: cancel.clone() });
        cancel
    }

    pub(crate) fn contains(&self, id: &JobId) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn get(&self, id: &JobId) -> Option<&JobEntry> {
        self.entries.get(id)
    }

    pub(crate) fn entry_mut(&mut self, id: &JobId) -> Option<&mut JobEntry> {
        self.entries.get_mut(id)
    }

    /// All ids in insertion order.
    pub(crate) fn ids(&self) -> Vec<JobId> {
        self.entries.keys().cloned().collect()
    }

    /// Transition `Pending -> Running`; false if a stop won the race.
    pub(crate) fn begin(&mut self, id: &JobId, epoch_ms: u64) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => entry.job.begin(epoch_ms),
            None => false,
        }
    }

    /// Apply a terminal outcome. First terminal state wins; returns false
    /// if the job is gone or already terminal, in which case nothing
    /// (including output) is touched.
    pub(crate) fn apply(&mut self, id: &JobId, outcome: Outcome, epoch_ms: u64) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            return false;
        };
        if !entry.job.finish(outcome.state, epoch_ms) {
            return false;
        }
        entry.job.exit_code = outcome.exit_code;
        entry.job.error = outcome.error;
        entry.job.output = outcome.output;
        true
    }

    /// True when every listed id is terminal or no longer in the table.
    /// (Only terminal jobs can leave the table, so absence counts.)
    pub(crate) fn all_terminal(&self, ids: &[JobId]) -> bool {
        ids.iter().all(|id| self.entries.get(id).is_none_or(|e| e.job.is_terminal()))
    }

    /// Snapshots of every job, in insertion order.
    pub(crate) fn snapshots(&self, now_ms: u64) -> Vec<JobSnapshot> {
        self.entries.values().map(|e| e.job.snapshot(now_ms)).collect()
    }

    /// Remove terminal jobs (all of them when `ids` is `None`), preserving
    /// the order of the remainder. Non-terminal and unknown ids are
    /// skipped. Returns the removed ids.
    pub(crate) fn remove_terminal(&mut self, ids: Option<&[JobId]>) -> Vec<JobId> {
        let candidates: Vec<JobId> = match ids {
            Some(ids) => ids.to_vec(),
            None => self.ids(),
        };
        let mut removed = Vec::new();
        for id in candidates {
            let terminal = self.entries.get(&id).is_some_and(|e| e.job.is_terminal());
            if terminal {
                self.entries.shift_remove(&id);
                removed.push(id);
            }
        }
        removed
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
