// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! The submit/wait/report loop shared by `run` and `each`.
//!
//! Commands are submitted in chunks; each chunk is waited on a tick at a
//! time so the progress line can repaint and Ctrl-C can interrupt between
//! polls. Finished chunks are cleaned out of the runner table so long file
//! walks do not accumulate records.

use std::io::{IsTerminal, Write};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;

use volley_core::{format_elapsed_ms, CommandSpec, JobState};
use volley_runner::{JobReport, JobRunner, RunnerConfig, WaitReport};

use crate::color;
use crate::env;
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat, RunSummary};
use crate::table::{Column, Table};

/// Options shared by every job-running command.
#[derive(Args, Debug)]
pub struct BatchOpts {
    /// Cap on concurrently running jobs (default: all at once)
    #[arg(short = 'j', long, value_name = "N")]
    pub max_parallel: Option<NonZeroUsize>,

    /// Per-job deadline, e.g. "30s", "5m"; jobs over it are marked timed-out
    #[arg(long, value_name = "DURATION")]
    pub job_timeout: Option<String>,

    /// Grace between the polite stop signal and the forced kill (default "2s")
    #[arg(long, value_name = "DURATION")]
    pub grace: Option<String>,

    /// Overall budget; when it runs out, outstanding jobs are stopped
    #[arg(long, value_name = "DURATION")]
    pub wait_timeout: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Print only failures and the summary line
    #[arg(short, long)]
    pub quiet: bool,

    /// Show output frames for succeeded jobs too
    #[arg(long)]
    pub show_all: bool,
}

impl BatchOpts {
    pub fn runner_config(&self) -> Result<RunnerConfig> {
        let mut config = RunnerConfig::new();
        if let Some(n) = self.max_parallel {
            config = config.max_parallel(n);
        }
        if let Some(ref s) = self.job_timeout {
            config = config.job_timeout(parse_duration(s)?);
        }
        if let Some(ref s) = self.grace {
            config = config.grace_period(parse_duration(s)?);
        } else if let Some(grace) = env::grace_period() {
            config = config.grace_period(grace);
        }
        if let Some(cap) = env::max_output_bytes() {
            config = config.max_output_bytes(cap);
        }
        Ok(config)
    }

    pub fn wait_budget(&self) -> Result<Option<Duration>> {
        self.wait_timeout.as_deref().map(parse_duration).transpose()
    }
}

/// Parse a human-readable duration string (e.g. "5m", "30s", "1h30m").
pub fn parse_duration(s: &str) -> Result<Duration> {
    let invalid = || anyhow::anyhow!("invalid duration: {}", s);
    let mut total_secs: u64 = 0;
    let mut current_num = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            current_num.push(c);
        } else {
            let n: u64 = current_num.parse().map_err(|_| invalid())?;
            current_num.clear();
            let scale = match c {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => anyhow::bail!("unknown duration unit '{}' in: {}", c, s),
            };
            total_secs = n
                .checked_mul(scale)
                .and_then(|part| total_secs.checked_add(part))
                .ok_or_else(invalid)?;
        }
    }
    // Bare number → seconds
    if !current_num.is_empty() {
        let n: u64 = current_num.parse().map_err(|_| invalid())?;
        total_secs = total_secs.checked_add(n).ok_or_else(invalid)?;
    }
    if total_secs == 0 {
        anyhow::bail!("duration must be > 0: {}", s);
    }
    Ok(Duration::from_secs(total_secs))
}

/// Everything a finished (or interrupted) run produced.
struct RunOutcome {
    reports: Vec<JobReport>,
    /// Every submitted job reached a terminal state
    completed: bool,
    /// Ctrl-C ended the run early
    interrupted: bool,
    /// Commands still queued when the run ended
    skipped: usize,
}

/// Run every command and report; the process exit code comes from the
/// returned error (none for a fully successful run).
pub async fn execute(
    commands: Vec<CommandSpec>,
    batch_size: Option<NonZeroUsize>,
    opts: &BatchOpts,
) -> Result<()> {
    let runner = JobRunner::new(opts.runner_config()?);
    let budget = opts.wait_budget()?;
    let started = Instant::now();

    let outcome = run_batches(&runner, commands, batch_size, budget, opts, started).await?;
    render(&outcome, started.elapsed(), opts)?;

    if outcome.interrupted {
        return Err(ExitError::silent(130).into());
    }
    if !outcome.completed || outcome.reports.iter().any(|j| !j.succeeded()) {
        return Err(ExitError::silent(1).into());
    }
    Ok(())
}

async fn run_batches(
    runner: &JobRunner,
    commands: Vec<CommandSpec>,
    batch_size: Option<NonZeroUsize>,
    budget: Option<Duration>,
    opts: &BatchOpts,
    started: Instant,
) -> Result<RunOutcome> {
    let total = commands.len();
    let chunk = batch_size.map(NonZeroUsize::get).unwrap_or(total.max(1));
    let tick = env::tick_interval();
    let hard_deadline = budget.map(|d| started + d);
    let progress =
        opts.output == OutputFormat::Text && !opts.quiet && std::io::stdout().is_terminal();

    let mut reports: Vec<JobReport> = Vec::with_capacity(total);
    let mut completed = true;
    let mut interrupted = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut queue = commands.into_iter();
    'batches: loop {
        let batch: Vec<CommandSpec> = queue.by_ref().take(chunk).collect();
        if batch.is_empty() {
            break;
        }
        let ids = runner.submit_many(batch)?;
        tracing::debug!(jobs = ids.len(), remaining = queue.len(), "chunk submitted");

        let done: WaitReport = 'chunk: loop {
            if hard_deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::debug!("wait budget exhausted; stopping outstanding jobs");
                runner.stop(None)?;
                completed = false;
                break 'chunk runner.wait(Some(&ids), None).await?;
            }
            // Shorten the last poll so the budget is honored, not the tick.
            let window = match hard_deadline {
                Some(d) => tick.min(d.saturating_duration_since(Instant::now())),
                None => tick,
            };
            tokio::select! {
                result = runner.wait(Some(&ids), Some(window)) => {
                    let report = result?;
                    if report.completed {
                        break 'chunk report;
                    }
                    if progress {
                        paint_progress(runner, reports.len(), total, started);
                    }
                }
                _ = &mut ctrl_c => {
                    interrupted = true;
                    eprintln!("\ninterrupt: stopping jobs (Ctrl-C again to abort)");
                    runner.stop(None)?;
                    let drain = runner.wait(Some(&ids), None);
                    tokio::select! {
                        result = drain => break 'chunk result?,
                        _ = tokio::signal::ctrl_c() => std::process::exit(130),
                    }
                }
            }
        };

        reports.extend(done.jobs);
        runner.cleanup(Some(&ids));
        if interrupted || !completed {
            break 'batches;
        }
    }

    if progress {
        clear_progress();
    }
    Ok(RunOutcome { reports, completed, interrupted, skipped: queue.len() })
}

/// Single-line progress repaint, TTY only.
fn paint_progress(runner: &JobRunner, finished_chunks: usize, total: usize, started: Instant) {
    let snaps = runner.status();
    let done = finished_chunks + snaps.iter().filter(|s| s.state.is_terminal()).count();
    let running = snaps.iter().filter(|s| s.state == JobState::Running).count();
    let waiting = total.saturating_sub(done + running);
    let elapsed = format_elapsed_ms(started.elapsed().as_millis() as u64);
    print!(
        "\r\x1b[2K{} {}",
        color::context(&format!("{}/{} done, {} running, {} waiting", done, total, running, waiting)),
        color::muted(&format!("({})", elapsed)),
    );
    let _ = std::io::stdout().flush();
}

fn clear_progress() {
    print!("\r\x1b[2K");
    let _ = std::io::stdout().flush();
}

fn render(outcome: &RunOutcome, elapsed: Duration, opts: &BatchOpts) -> Result<()> {
    let summary = RunSummary {
        completed: outcome.completed,
        interrupted: outcome.interrupted,
        skipped: outcome.skipped,
        jobs: &outcome.reports,
    };
    output::format_or_json(opts.output, &summary, || {
        if !opts.quiet && !outcome.reports.is_empty() {
            let mut table = Table::new(vec![
                Column::muted("ID"),
                Column::literal("COMMAND"),
                Column::status("STATUS"),
                Column::left("TIME"),
            ]);
            for job in &outcome.reports {
                table.row(vec![
                    job.id.short(8).to_string(),
                    job.command.clone(),
                    output::state_label(job),
                    format_elapsed_ms(job.elapsed_ms),
                ]);
            }
            table.render(&mut std::io::stdout());
            println!();
        }
        for job in &outcome.reports {
            if opts.show_all || !job.succeeded() {
                output::print_job_frame(job);
            }
        }
        println!("{}", output::summary_line(&outcome.reports, elapsed.as_millis() as u64));
        if outcome.skipped > 0 {
            println!(
                "{}",
                color::muted(&format!("{} queued command(s) never submitted", outcome.skipped))
            );
        }
    })
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
