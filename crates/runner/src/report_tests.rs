// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

use super::*;
use volley_core::{CommandSpec, JobOutput};

fn finished_job(state: JobState, exit_code: Option<i32>) -> Job {
    let mut job = Job::submitted(JobId::new(), CommandSpec::new("echo").arg("hi"), 1_000);
    job.begin(1_100);
    job.finish(state, 1_600);
    job.exit_code = exit_code;
    job
}

fn report_for(state: JobState, exit_code: Option<i32>) -> JobReport {
    JobReport::from_job(&finished_job(state, exit_code), 2_000)
}

#[test]
fn from_job_maps_record_fields() {
    let mut job = finished_job(JobState::Succeeded, Some(0));
    job.output = Some(JobOutput { stdout: "hi\n".into(), ..Default::default() });

    let report = JobReport::from_job(&job, 2_000);

    assert_eq!(report.id, job.id);
    assert_eq!(report.command, "echo hi");
    assert_eq!(report.state, JobState::Succeeded);
    assert_eq!(report.exit_code, Some(0));
    assert_eq!(report.elapsed_ms, 500);
    assert_eq!(report.output.as_ref().unwrap().stdout, "hi\n");
    assert!(report.succeeded());
}

#[test]
fn all_succeeded_requires_completion_and_clean_exits() {
    let clean = WaitReport { completed: true, jobs: vec![report_for(JobState::Succeeded, Some(0))] };
    assert!(clean.all_succeeded());

    let timed_out_wait =
        WaitReport { completed: false, jobs: vec![report_for(JobState::Succeeded, Some(0))] };
    assert!(!timed_out_wait.all_succeeded());

    let with_failure = WaitReport {
        completed: true,
        jobs: vec![report_for(JobState::Succeeded, Some(0)), report_for(JobState::Failed, Some(3))],
    };
    assert!(!with_failure.all_succeeded());
}

#[test]
fn failures_lists_everything_but_success() {
    let report = WaitReport {
        completed: true,
        jobs: vec![
            report_for(JobState::Succeeded, Some(0)),
            report_for(JobState::Failed, Some(3)),
            report_for(JobState::Cancelled, None),
        ],
    };

    let states: Vec<JobState> = report.failures().map(|j| j.state).collect();
    assert_eq!(states, vec![JobState::Failed, JobState::Cancelled]);
}

#[test]
fn stop_report_counts_affected_jobs() {
    let report = StopReport { signalled: 2, cancelled_pending: 1, already_terminal: 4 };
    assert_eq!(report.affected(), 3);
    assert_eq!(StopReport::default().affected(), 0);
}

#[test]
fn job_report_serializes_without_unset_fields() {
    let report = report_for(JobState::Cancelled, None);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["state"], "cancelled");
    assert!(json.get("exit_code").is_none());
    assert!(json.get("output").is_none());
}
