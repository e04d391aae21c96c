// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! The runner: submission, status, waiting, stopping, and cleanup.
//!
//! Every submitted job gets a spawned driver task that owns its process
//! from start to reaped exit. State transitions have a single owner: the
//! driver performs `Pending -> Running` and `Running -> terminal`;
//! [`JobRunner::stop`] performs `Pending -> Cancelled` directly (there is
//! no process yet) and otherwise only trips the job's cancellation token.
//! Waiters park on one [`Notify`] that is pinged after every terminal
//! transition. In bounded mode a dispatcher task grants start permits in
//! submission order; queue position is taken inside `submit` itself, so
//! driver wakeup order cannot reorder starts.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, Notify, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use volley_core::{Clock, CommandSpec, Job, JobId, JobOutput, JobSnapshot, JobState, SystemClock};

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::exec::{self, Capture, ExitKind, KillOutcome};
use crate::report::{JobReport, StopReport, WaitReport};
use crate::table::{JobTable, Outcome};

/// Concurrent external-command job runner.
///
/// Cheap to clone; all clones share one job table. Requires a tokio
/// runtime: [`JobRunner::submit`] spawns driver tasks, and constructing a
/// bounded runner spawns its permit dispatcher.
pub struct JobRunner<C: Clock = SystemClock> {
    shared: Arc<Shared<C>>,
}

/// Filled by the dispatcher with the permit that lets one driver start.
type StartSlot = oneshot::Sender<OwnedSemaphorePermit>;

struct Shared<C: Clock> {
    table: Mutex<JobTable>,
    /// Pinged (notify_waiters) after every terminal transition.
    done: Notify,
    /// Present only in bounded mode; feeds the permit dispatcher in
    /// submission order.
    starts: Option<mpsc::UnboundedSender<StartSlot>>,
    config: RunnerConfig,
    clock: C,
}

impl<C: Clock> Clone for JobRunner<C> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl JobRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl<C: Clock + 'static> JobRunner<C> {
    /// Build a runner over an explicit clock (tests use [`ManualClock`]).
    ///
    /// [`ManualClock`]: volley_core::ManualClock
    pub fn with_clock(config: RunnerConfig, clock: C) -> Self {
        let starts = config.max_parallel.map(|n| {
            let limiter = Arc::new(Semaphore::new(n.get()));
            let (starts, queue) = mpsc::unbounded_channel();
            tokio::spawn(dispatch(limiter, queue));
            starts
        });
        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(JobTable::default()),
                done: Notify::new(),
                starts,
                config,
                clock,
            }),
        }
    }

    /// Submit one command for asynchronous execution.
    ///
    /// Returns immediately with the new job's id; the command itself starts
    /// on a spawned driver task (or queues for a permit in bounded mode).
    /// An empty command is rejected here, synchronously, and no job is
    /// recorded for it.
    pub fn submit(&self, command: CommandSpec) -> Result<JobId, RunnerError> {
        if command.is_empty() {
            return Err(RunnerError::EmptyCommand);
        }
        let job = Job::submitted(JobId::new(), command.clone(), self.shared.clock.epoch_ms());
        let id = job.id.clone();
        let cancel = self.shared.table.lock().insert(job);
        // Queue position under a bound is taken here, not in the driver,
        // so submission order decides start order.
        let start = self.shared.starts.as_ref().map(|starts| {
            let (slot, start) = oneshot::channel();
            let _ = starts.send(slot);
            start
        });
        tracing::debug!(job = %id, command = %command.line(), "job submitted");

        let shared = Arc::clone(&self.shared);
        let driver_id = id.clone();
        tokio::spawn(async move {
            drive(shared, driver_id, command, cancel, start).await;
        });
        Ok(id)
    }

    /// Submit a batch, returning ids in the same order as the commands.
    ///
    /// Validation is all-or-nothing: if any command is empty, nothing from
    /// the batch is submitted.
    pub fn submit_many(
        &self,
        commands: impl IntoIterator<Item = CommandSpec>,
    ) -> Result<Vec<JobId>, RunnerError> {
        let commands: Vec<CommandSpec> = commands.into_iter().collect();
        if commands.iter().any(CommandSpec::is_empty) {
            return Err(RunnerError::EmptyCommand);
        }
        commands.into_iter().map(|command| self.submit(command)).collect()
    }

    /// Snapshot every known job, in submission order. Never blocks on job
    /// completion; safe to call from a render loop.
    pub fn status(&self) -> Vec<JobSnapshot> {
        let now_ms = self.shared.clock.epoch_ms();
        self.shared.table.lock().snapshots(now_ms)
    }

    /// Full record for one job, if it is still in the table.
    pub fn job(&self, id: &JobId) -> Option<Job> {
        self.shared.table.lock().get(id).map(|entry| entry.job.clone())
    }

    /// Block until the listed jobs (all jobs when `ids` is `None`) are
    /// terminal, or until `timeout` elapses.
    ///
    /// The timeout is advisory: it bounds this call, never the jobs, which
    /// keep running and can be waited on again. `completed` in the report
    /// reflects the table at return time, so each entry's state is
    /// consistent with the flag. Unknown ids are rejected up front;
    /// requested jobs removed by a concurrent cleanup mid-wait are treated
    /// as terminal and omitted from the report.
    pub async fn wait(
        &self,
        ids: Option<&[JobId]>,
        timeout: Option<Duration>,
    ) -> Result<WaitReport, RunnerError> {
        let targets = self.resolve_targets(ids)?;
        match timeout {
            Some(limit) => {
                let _ = tokio::time::timeout(limit, self.wait_terminal(&targets)).await;
            }
            None => self.wait_terminal(&targets).await,
        }
        Ok(self.report(&targets))
    }

    /// Best-effort termination of the listed jobs (all when `ids` is
    /// `None`).
    ///
    /// Pending jobs are cancelled in place. Running jobs have their
    /// cancellation token tripped; each driver then walks the polite-kill
    /// ladder (SIGTERM to the process group, grace period, SIGKILL) and
    /// records the job as `Cancelled` once the process is reaped, so the
    /// job may still read `Running` for a moment after this returns.
    /// Already-terminal jobs are left untouched and tallied.
    pub fn stop(&self, ids: Option<&[JobId]>) -> Result<StopReport, RunnerError> {
        let mut report = StopReport::default();
        let mut to_cancel: Vec<CancellationToken> = Vec::new();
        {
            let now_ms = self.shared.clock.epoch_ms();
            let mut table = self.shared.table.lock();
            let targets = match ids {
                Some(ids) => {
                    for id in ids {
                        if !table.contains(id) {
                            return Err(RunnerError::UnknownJob(id.clone()));
                        }
                    }
                    ids.to_vec()
                }
                None => table.ids(),
            };
            for id in &targets {
                let Some(entry) = table.entry_mut(id) else { continue };
                if entry.job.is_terminal() {
                    report.already_terminal += 1;
                    continue;
                }
                if entry.job.state == JobState::Pending {
                    // Never started; no process to signal.
                    entry.job.finish(JobState::Cancelled, now_ms);
                    report.cancelled_pending += 1;
                } else {
                    report.signalled += 1;
                }
                to_cancel.push(entry.cancel.clone());
            }
        }
        // Token wakeups happen outside the table lock.
        for token in to_cancel {
            token.cancel();
        }
        if report.cancelled_pending > 0 {
            self.shared.done.notify_waiters();
        }
        if report.affected() > 0 {
            tracing::debug!(
                signalled = report.signalled,
                cancelled_pending = report.cancelled_pending,
                "stop requested"
            );
        }
        Ok(report)
    }

    /// Remove finished jobs from the table (all finished jobs when `ids`
    /// is `None`), returning the ids actually removed.
    ///
    /// Pending and running jobs are never removed. Unknown ids are
    /// tolerated: cleanup is how callers forget jobs, and forgetting twice
    /// is not an error.
    pub fn cleanup(&self, ids: Option<&[JobId]>) -> Vec<JobId> {
        let removed = self.shared.table.lock().remove_terminal(ids);
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "cleaned up finished jobs");
        }
        removed
    }

    fn resolve_targets(&self, ids: Option<&[JobId]>) -> Result<Vec<JobId>, RunnerError> {
        let table = self.shared.table.lock();
        match ids {
            Some(ids) => {
                for id in ids {
                    if !table.contains(id) {
                        return Err(RunnerError::UnknownJob(id.clone()));
                    }
                }
                Ok(ids.to_vec())
            }
            None => Ok(table.ids()),
        }
    }

    async fn wait_terminal(&self, targets: &[JobId]) {
        loop {
            // Register before checking, so a notify between the check and
            // the await is not lost.
            let notified = self.shared.done.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.shared.table.lock().all_terminal(targets) {
                return;
            }
            notified.await;
        }
    }

    fn report(&self, targets: &[JobId]) -> WaitReport {
        let now_ms = self.shared.clock.epoch_ms();
        let table = self.shared.table.lock();
        let jobs = targets
            .iter()
            .filter_map(|id| table.get(id))
            .map(|entry| JobReport::from_job(&entry.job, now_ms))
            .collect();
        WaitReport { completed: table.all_terminal(targets), jobs }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher and driver tasks
// ---------------------------------------------------------------------------

/// Grant start permits strictly in submission order.
///
/// Queue position comes from `submit` itself, not from driver wakeup
/// order, so a later submission never starts while an earlier one is
/// still waiting for a slot. When a driver is already gone (stopped
/// while pending), the slot send fails and the permit drops, freeing
/// that slot for the next in line.
async fn dispatch(limiter: Arc<Semaphore>, mut queue: mpsc::UnboundedReceiver<StartSlot>) {
    while let Some(slot) = queue.recv().await {
        // The semaphore is never closed.
        let Ok(permit) = Arc::clone(&limiter).acquire_owned().await else {
            return;
        };
        let _ = slot.send(permit);
    }
}

/// Why the driver stopped waiting on the child.
enum Verdict {
    Exited(std::io::Result<std::process::ExitStatus>),
    Stopped,
    DeadlineExceeded,
}

/// Own one job from submission to terminal state.
async fn drive<C: Clock>(
    shared: Arc<Shared<C>>,
    id: JobId,
    spec: CommandSpec,
    cancel: CancellationToken,
    start: Option<oneshot::Receiver<OwnedSemaphorePermit>>,
) {
    // Bounded mode: wait for this job's turn, then hold the permit for
    // the lifetime of the process.
    let _permit = match start {
        Some(start) => tokio::select! {
            permit = start => match permit {
                Ok(permit) => Some(permit),
                // Runner dropped while this job was queued.
                Err(_) => return,
            },
            // stop() already recorded the job as Cancelled.
            _ = cancel.cancelled() => return,
        },
        None => None,
    };

    let started = shared.clock.epoch_ms();
    if !shared.table.lock().begin(&id, started) {
        // Cancelled while pending.
        return;
    }

    let mut child = match exec::spawn(&spec) {
        Ok(child) => child,
        Err(err) => {
            tracing::warn!(job = %id, program = %spec.program, error = %err, "spawn failed");
            finish(&shared, &id, Outcome::spawn_failed(&spec.program, &err));
            return;
        }
    };
    tracing::debug!(job = %id, command = %spec.line(), "job started");

    let cap = shared.config.max_output_bytes;
    let drain_stop = CancellationToken::new();
    let stdout = child.stdout.take();
    let stop = drain_stop.clone();
    let out_task = tokio::spawn(async move {
        match stdout {
            Some(stream) => exec::drain(stream, cap, stop).await,
            None => Capture::new(cap),
        }
    });
    let stderr = child.stderr.take();
    let stop = drain_stop.clone();
    let err_task = tokio::spawn(async move {
        match stderr {
            Some(stream) => exec::drain(stream, cap, stop).await,
            None => Capture::new(cap),
        }
    });

    let deadline = spec.timeout.or(shared.config.job_timeout);
    let verdict = {
        let expired = async {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => pending().await,
            }
        };
        // Biased so that a process that exits right as it is cancelled or
        // times out still gets its natural terminal state.
        tokio::select! {
            biased;
            status = child.wait() => Verdict::Exited(status),
            _ = cancel.cancelled() => Verdict::Stopped,
            _ = expired => Verdict::DeadlineExceeded,
        }
    };

    let grace = shared.config.grace_period;
    let outcome = match verdict {
        Verdict::Exited(Ok(status)) => {
            let output = collect(out_task, err_task).await;
            match exec::classify_exit(status) {
                ExitKind::Code(0) => Outcome::succeeded(output),
                ExitKind::Code(code) => Outcome::failed(code, output),
                ExitKind::Signalled(signal) => Outcome::signalled(signal, output),
            }
        }
        Verdict::Exited(Err(err)) => {
            tracing::warn!(job = %id, error = %err, "failed to reap process");
            let output = collect(out_task, err_task).await;
            Outcome {
                state: JobState::Failed,
                exit_code: None,
                error: Some(format!("failed to reap process: {}", err)),
                output: Some(output),
            }
        }
        Verdict::Stopped => {
            let forced = force_was_needed(&id, exec::terminate(&mut child, grace).await, grace);
            let output =
                collect_bounded(out_task, err_task, &drain_stop, exec::DRAIN_GRACE).await;
            Outcome::cancelled(Some(output), forced)
        }
        Verdict::DeadlineExceeded => {
            tracing::debug!(job = %id, "job deadline exceeded");
            let forced = force_was_needed(&id, exec::terminate(&mut child, grace).await, grace);
            let output =
                collect_bounded(out_task, err_task, &drain_stop, exec::DRAIN_GRACE).await;
            Outcome::timed_out(output, forced)
        }
    };

    finish(&shared, &id, outcome);
}

fn force_was_needed(id: &JobId, outcome: KillOutcome, grace: Duration) -> bool {
    let forced = matches!(outcome, KillOutcome::Forced);
    if forced {
        tracing::warn!(
            job = %id,
            grace_ms = grace.as_millis() as u64,
            "grace period expired; killed process group"
        );
    }
    forced
}

/// Join both capture tasks into a [`JobOutput`].
async fn collect(out_task: JoinHandle<Capture>, err_task: JoinHandle<Capture>) -> JobOutput {
    let (stdout, stdout_truncated) = match out_task.await {
        Ok(capture) => capture.finish(),
        Err(_) => (String::new(), false),
    };
    let (stderr, stderr_truncated) = match err_task.await {
        Ok(capture) => capture.finish(),
        Err(_) => (String::new(), false),
    };
    JobOutput { stdout, stderr, stdout_truncated, stderr_truncated }
}

/// Like [`collect`], but for the kill paths: the pipes normally close
/// with the process group, so give them `limit` to hit EOF, then cut the
/// drains off and keep whatever they have. A descendant that re-led its
/// own session can hold the pipes open past the kill.
async fn collect_bounded(
    mut out_task: JoinHandle<Capture>,
    mut err_task: JoinHandle<Capture>,
    drain_stop: &CancellationToken,
    limit: Duration,
) -> JobOutput {
    let deadline = tokio::time::Instant::now() + limit;
    let (stdout, stdout_truncated) = finish_capture(&mut out_task, drain_stop, deadline).await;
    let (stderr, stderr_truncated) = finish_capture(&mut err_task, drain_stop, deadline).await;
    JobOutput { stdout, stderr, stdout_truncated, stderr_truncated }
}

async fn finish_capture(
    task: &mut JoinHandle<Capture>,
    drain_stop: &CancellationToken,
    deadline: tokio::time::Instant,
) -> (String, bool) {
    let capture = match tokio::time::timeout_at(deadline, &mut *task).await {
        Ok(joined) => joined,
        Err(_) => {
            // Something outside the group still holds the pipe. A cut-off
            // drain returns promptly with its partial capture.
            drain_stop.cancel();
            (&mut *task).await
        }
    };
    match capture {
        Ok(capture) => capture.finish(),
        Err(_) => (String::new(), false),
    }
}

/// Apply a terminal outcome and wake waiters.
fn finish<C: Clock>(shared: &Shared<C>, id: &JobId, outcome: Outcome) {
    let state = outcome.state;
    let now_ms = shared.clock.epoch_ms();
    let applied = shared.table.lock().apply(id, outcome, now_ms);
    if applied {
        tracing::debug!(job = %id, state = %state, "job finished");
        shared.done.notify_waiters();
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
