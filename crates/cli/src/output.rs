// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

use clap::ValueEnum;
use serde::Serialize;

use volley_core::{format_elapsed_ms, JobState};
use volley_runner::JobReport;

use crate::color;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format-branch helper for report output.
///
/// Renders as JSON when `format` is `Json`, otherwise calls `text_fn`.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            text_fn();
        }
    }
    Ok(())
}

/// JSON shape of a whole run, as printed by `--output json`.
#[derive(Serialize)]
pub struct RunSummary<'a> {
    /// Every submitted job reached a terminal state
    pub completed: bool,
    /// Ctrl-C ended the run before all jobs finished
    pub interrupted: bool,
    /// Commands still queued (never submitted) when the run ended
    pub skipped: usize,
    pub jobs: &'a [JobReport],
}

/// State word plus exit-code decoration, e.g. "failed (exit 3)".
pub fn state_label(job: &JobReport) -> String {
    match (job.state, job.exit_code) {
        (JobState::Failed, Some(code)) => format!("failed (exit {})", code),
        _ => job.state.to_string(),
    }
}

/// One-line tally of a finished run, e.g. "4 jobs: 3 succeeded, 1 failed (1.2s)".
pub fn summary_line(jobs: &[JobReport], elapsed_ms: u64) -> String {
    let display_order = [
        JobState::Succeeded,
        JobState::Failed,
        JobState::Cancelled,
        JobState::TimedOut,
        JobState::Running,
        JobState::Pending,
    ];
    let mut parts = Vec::new();
    for state in display_order {
        let count = jobs.iter().filter(|j| j.state == state).count();
        if count > 0 {
            parts.push(format!("{} {}", count, state));
        }
    }
    if parts.is_empty() {
        parts.push("nothing to do".to_string());
    }
    format!(
        "{} job{}: {} ({})",
        jobs.len(),
        if jobs.len() == 1 { "" } else { "s" },
        parts.join(", "),
        format_elapsed_ms(elapsed_ms)
    )
}

/// Print one job's captured output framed for scanning, with the terminal
/// state on the closing rail.
pub fn print_job_frame(job: &JobReport) {
    let title = format!("{} {}", job.id.short(8), job.command);
    println!("╭── {} ──", color::header(&title));
    match &job.output {
        Some(output) if !output.is_empty() => {
            if !output.stdout.is_empty() {
                print_stream("stdout", &output.stdout, output.stdout_truncated);
            }
            if !output.stderr.is_empty() {
                print_stream("stderr", &output.stderr, output.stderr_truncated);
            }
        }
        _ => println!("{}", color::muted("(no output)")),
    }
    if let Some(error) = &job.error {
        println!("{} {}", color::context("error:"), error);
    }
    println!("╰── {} ──", color::status(&state_label(job)));
}

fn print_stream(name: &str, content: &str, truncated: bool) {
    if truncated {
        println!("{}", color::muted(&format!("[{}] (tail only; earlier output dropped)", name)));
    } else {
        println!("{}", color::muted(&format!("[{}]", name)));
    }
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
}
