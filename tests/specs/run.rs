// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! `volley run` specs
//!
//! Submit commands, wait for the batch, check the rendered report and
//! exit codes.

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_nonzero() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn help_shows_subcommands() {
    cli().args(&["--help"]).passes().stdout_has("run").stdout_has("each");
}

#[test]
fn run_help_shows_usage() {
    cli().args(&["run", "--help"]).passes().stdout_has("Usage:").stdout_has("--batch-size");
}

#[test]
fn run_executes_a_command_and_exits_zero() {
    let temp = Project::empty();
    temp.volley()
        .args(&["run", "--", "echo", "hello"])
        .passes()
        .stdout_has("echo hello")
        .stdout_has("1 job: 1 succeeded");
}

#[test]
fn separator_splits_into_multiple_commands() {
    let temp = Project::empty();
    temp.volley()
        .args(&["run", "--", "echo", "a", ":::", "echo", "b"])
        .passes()
        .stdout_has("echo a")
        .stdout_has("echo b")
        .stdout_has("2 jobs: 2 succeeded");
}

#[test]
fn failing_command_exits_one_and_shows_its_output() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .args(&["run", "--", "sh", "-c", "echo boom >&2; exit 3"])
        .fails();
    assert_eq!(result.code(), Some(1));
    result.stdout_has("failed (exit 3)").stdout_has("[stderr]").stdout_has("boom");
}

#[test]
fn missing_binary_is_reported_as_failed() {
    let temp = Project::empty();
    let result = temp.volley().args(&["run", "--", "/no/such/binary-volley"]).fails();
    assert_eq!(result.code(), Some(1));
    result.stdout_has("failed").stdout_has("failed to start");
}

#[test]
fn empty_group_is_a_usage_error() {
    let temp = Project::empty();
    let result = temp.volley().args(&["run", "--", "echo", "a", ":::"]).fails();
    assert_eq!(result.code(), Some(2));
    result.stderr_has("empty command");
}

#[test]
fn quiet_suppresses_the_table_but_keeps_the_summary() {
    let temp = Project::empty();
    let result = temp.volley().args(&["run", "-q", "--", "echo", "hello"]).passes();
    let stdout = result.stdout();
    assert!(!stdout.contains("COMMAND"), "table should be suppressed:\n{}", stdout);
    assert!(stdout.contains("1 job: 1 succeeded"), "summary should remain:\n{}", stdout);
}

#[test]
fn show_all_prints_frames_for_successes() {
    let temp = Project::empty();
    temp.volley()
        .args(&["run", "--show-all", "--", "echo", "marker-4217"])
        .passes()
        .stdout_has("[stdout]")
        .stdout_has("marker-4217");
}

#[test]
fn json_output_is_machine_readable() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .args(&["run", "--output", "json", "--", "sh", "-c", "echo hi"])
        .passes();
    let report: serde_json::Value =
        serde_json::from_str(&result.stdout()).expect("stdout should be JSON");

    assert_eq!(report["completed"], true);
    assert_eq!(report["interrupted"], false);
    assert_eq!(report["skipped"], 0);
    let job = &report["jobs"][0];
    assert_eq!(job["state"], "succeeded");
    assert_eq!(job["exit_code"], 0);
    assert_eq!(job["output"]["stdout"], "hi\n");
}

#[test]
fn json_output_carries_failure_details() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .args(&["run", "--output", "json", "--", "sh", "-c", "exit 7"])
        .fails();
    assert_eq!(result.code(), Some(1));

    let report: serde_json::Value =
        serde_json::from_str(&result.stdout()).expect("stdout should be JSON");
    assert_eq!(report["completed"], true);
    assert_eq!(report["jobs"][0]["state"], "failed");
    assert_eq!(report["jobs"][0]["exit_code"], 7);
}

#[test]
fn output_cap_env_keeps_only_the_tail() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .env("VOLLEY_MAX_OUTPUT_BYTES", "64")
        .args(&["run", "--output", "json", "--", "sh", "-c", "seq 1 100; echo tail-end"])
        .passes();

    let report: serde_json::Value =
        serde_json::from_str(&result.stdout()).expect("stdout should be JSON");
    let output = &report["jobs"][0]["output"];
    assert_eq!(output["stdout_truncated"], true);
    let text = output["stdout"].as_str().expect("stdout should be a string");
    assert!(text.len() <= 64, "cap not enforced: {} bytes", text.len());
    assert!(text.ends_with("tail-end\n"), "tail lost: {text:?}");
}

#[test]
fn debug_logging_reports_chunk_submission_on_stderr() {
    let temp = Project::empty();
    temp.volley()
        .env("RUST_LOG", "debug")
        .args(&["run", "--", "echo", "logged"])
        .passes()
        .stderr_has("chunk submitted");
}

#[test]
fn batch_size_still_runs_every_command() {
    let temp = Project::empty();
    temp.volley()
        .args(&["run", "--batch-size", "1", "--", "echo", "a", ":::", "echo", "b", ":::", "echo", "c"])
        .passes()
        .stdout_has("3 jobs: 3 succeeded");
}

#[test]
fn max_parallel_accepts_a_bound() {
    let temp = Project::empty();
    temp.volley()
        .args(&["run", "-j", "1", "--", "echo", "a", ":::", "echo", "b"])
        .passes()
        .stdout_has("2 jobs: 2 succeeded");
}

#[test]
fn cwd_flag_runs_commands_in_that_directory() {
    let temp = Project::empty();
    temp.file("sub/marker.txt", "present");
    temp.volley()
        .args(&["run", "--show-all", "--cwd", "sub", "--", "cat", "marker.txt"])
        .passes()
        .stdout_has("present");
}

#[test]
fn bad_duration_is_a_usage_error() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .args(&["run", "--job-timeout", "abc", "--", "echo", "hi"])
        .fails();
    assert_eq!(result.code(), Some(2));
    result.stderr_has("invalid duration");
}
