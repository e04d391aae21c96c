// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Job records and the job state machine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

crate::define_id! {
    /// Unique identifier for a submitted job.
    ///
    /// Assigned at submission time. Random generation means an id is never
    /// reused for the lifetime of a runner, even after cleanup removes the
    /// job from the table.
    pub struct JobId("job-");
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Submitted but not yet started (waiting for a permit in bounded mode)
    Pending,
    /// Underlying process is executing
    Running,
    /// Process exited with status 0
    Succeeded,
    /// Process exited non-zero, or could not be started at all
    Failed,
    /// Terminated by a stop request
    Cancelled,
    /// Terminated by the runner's per-job deadline
    TimedOut,
}

impl JobState {
    /// Check if no further transitions can occur from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled | JobState::TimedOut
        )
    }
}

crate::simple_display! {
    JobState {
        Pending => "pending",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
        TimedOut => "timed-out",
    }
}

/// Specification of one external command.
///
/// Always a structured argument vector; no field is ever interpreted by a
/// shell, so data in `args` cannot change what gets executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the child (inherits the runner's when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Environment variables layered over the inherited environment
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
    /// Per-command deadline, overriding the runner's configured job timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: HashMap::new(),
            timeout: None,
        }
    }

    /// Build from a full argument vector; `None` when the vector is empty.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = argv.into_iter();
        let program = iter.next()?;
        Some(Self::new(program).args(iter.map(Into::into).collect::<Vec<_>>()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    crate::setters! {
        option {
            /// Set the working directory for the child process.
            cwd: PathBuf,
            /// Set a per-command deadline.
            timeout: Duration,
        }
    }

    /// True when there is no program to execute.
    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// Single-line rendering for listings and logs.
    pub fn line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            let mut out = self.program.clone();
            for arg in &self.args {
                out.push(' ');
                out.push_str(arg);
            }
            out
        }
    }
}

/// Captured output of a finished job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutput {
    pub stdout: String,
    pub stderr: String,
    /// True when part of stdout is missing: it overflowed the capture cap,
    /// or the stream was cut off while still open after a kill
    #[serde(default)]
    pub stdout_truncated: bool,
    /// True when part of stderr is missing: it overflowed the capture cap,
    /// or the stream was cut off while still open after a kill
    #[serde(default)]
    pub stderr_truncated: bool,
}

impl JobOutput {
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// One submitted external-command execution tracked by the runner.
///
/// Timestamps are epoch milliseconds, each set at most once, ordered
/// `submitted_at_ms <= started_at_ms <= finished_at_ms`. A job that never
/// starts (cancelled while pending, or spawn failure) has no
/// `started_at_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub command: CommandSpec,
    pub state: JobState,
    pub submitted_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    /// Present once the process ran to exit (`Succeeded` or `Failed`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Runner-side failure description (spawn error, signal, forced kill);
    /// distinct from a non-zero exit code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Captured output; populated in the same transition that makes the
    /// state terminal, never observable earlier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<JobOutput>,
}

impl Job {
    /// Create a job in `Pending` state.
    pub fn submitted(id: JobId, command: CommandSpec, epoch_ms: u64) -> Self {
        Self {
            id,
            command,
            state: JobState::Pending,
            submitted_at_ms: epoch_ms,
            started_at_ms: None,
            finished_at_ms: None,
            exit_code: None,
            error: None,
            output: None,
        }
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Transition `Pending -> Running`, stamping `started_at_ms`.
    ///
    /// Returns false (and changes nothing) from any other state, e.g. when
    /// a stop request already cancelled the job before it started.
    pub fn begin(&mut self, epoch_ms: u64) -> bool {
        if self.state != JobState::Pending {
            return false;
        }
        self.state = JobState::Running;
        self.started_at_ms = Some(epoch_ms);
        true
    }

    /// Apply a terminal transition, stamping `finished_at_ms`.
    ///
    /// First terminal state wins: returns false (and changes nothing) if the
    /// job is already terminal. Non-terminal `state` arguments are rejected
    /// the same way, so a caller cannot move a job backwards.
    pub fn finish(&mut self, state: JobState, epoch_ms: u64) -> bool {
        if self.state.is_terminal() || !state.is_terminal() {
            return false;
        }
        self.state = state;
        self.finished_at_ms = Some(epoch_ms);
        true
    }

    /// Elapsed milliseconds for status listings.
    ///
    /// Pending: time since submission. Running: time since start. Terminal:
    /// run duration (zero for jobs that never started).
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            JobState::Pending => now_ms.saturating_sub(self.submitted_at_ms),
            JobState::Running => {
                now_ms.saturating_sub(self.started_at_ms.unwrap_or(self.submitted_at_ms))
            }
            _ => match (self.started_at_ms, self.finished_at_ms) {
                (Some(started), Some(finished)) => finished.saturating_sub(started),
                _ => 0,
            },
        }
    }

    /// Point-in-time view of this job for status listings.
    pub fn snapshot(&self, now_ms: u64) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            command: self.command.line(),
            state: self.state,
            elapsed_ms: self.elapsed_ms(now_ms),
            exit_code: self.exit_code,
        }
    }
}

/// Read-only view of one table entry, as returned by status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    /// Single-line rendering of the command (program + args)
    pub command: String,
    pub state: JobState,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
