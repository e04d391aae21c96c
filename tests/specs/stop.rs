// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Stop and timeout specs
//!
//! Deadlines, overall budgets, and Ctrl-C all end runs without leaving
//! processes behind.

use std::process::{Command, Stdio};

use crate::prelude::*;

#[test]
fn job_timeout_marks_long_commands_timed_out() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .args(&["run", "--job-timeout", "1", "--", "sleep", "30"])
        .fails();
    assert_eq!(result.code(), Some(1));
    result.stdout_has("timed-out");
}

#[test]
fn job_timeout_spares_quick_commands() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .args(&["run", "--job-timeout", "1", "--", "echo", "quick", ":::", "sleep", "30"])
        .fails();
    assert_eq!(result.code(), Some(1));
    result.stdout_has("2 jobs: 1 succeeded, 1 timed-out");
}

#[test]
fn wait_timeout_stops_outstanding_jobs() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .args(&["run", "--wait-timeout", "1", "--output", "json", "--", "sleep", "30"])
        .fails();
    assert_eq!(result.code(), Some(1));

    let report: serde_json::Value =
        serde_json::from_str(&result.stdout()).expect("stdout should be JSON");
    assert_eq!(report["completed"], false);
    assert_eq!(report["interrupted"], false);
    assert_eq!(report["jobs"][0]["state"], "cancelled");
}

#[test]
fn forced_kill_after_grace_is_reported() {
    let temp = Project::empty();
    let result = temp
        .volley()
        .args(&[
            "run",
            "--job-timeout",
            "1",
            "--grace",
            "1",
            "--",
            "sh",
            "-c",
            "trap '' TERM; sleep 30",
        ])
        .fails();
    assert_eq!(result.code(), Some(1));
    result.stdout_has("timed-out").stdout_has("deadline kill timed out; killed");
}

#[test]
fn sigint_stops_jobs_and_exits_130() {
    let temp = Project::empty();

    let mut child = temp
        .volley()
        .args(&["run", "--", "sleep", "30"])
        .command()
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("should spawn run process");

    let child_pid = child.id().to_string();

    // Give the runner time to submit and start the job before interrupting.
    let started = wait_for(SPEC_WAIT_MAX_MS, || {
        child.try_wait().expect("try_wait failed").is_none()
    });
    assert!(started, "run process should be running");
    std::thread::sleep(std::time::Duration::from_millis(300));

    Command::new("kill").args(["-2", &child_pid]).status().expect("should send SIGINT");

    let exited =
        wait_for(SPEC_WAIT_MAX_MS, || child.try_wait().expect("try_wait failed").is_some());
    assert!(exited, "run process should exit after SIGINT");

    let output = child.wait_with_output().expect("should collect output");
    // 130 = 128 + SIGINT(2), the conventional exit code for Ctrl+C
    assert_eq!(
        output.status.code(),
        Some(130),
        "should exit with code 130 on SIGINT, got: {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cancelled"), "report should show the job cancelled:\n{}", stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("interrupt:"), "should announce the interrupt:\n{}", stderr);
}
