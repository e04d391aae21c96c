// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! `volley each` specs
//!
//! Fan a command template out over globbed files.

use crate::prelude::*;

#[test]
fn runs_the_template_once_per_file() {
    let temp = Project::empty();
    temp.file("in/a.txt", "alpha");
    temp.file("in/b.txt", "beta");
    temp.file("in/skip.log", "nope");

    temp.volley()
        .args(&["each", "--files", "in/*.txt", "--", "cat", "{}"])
        .passes()
        .stdout_has("cat in/a.txt")
        .stdout_has("cat in/b.txt")
        .stdout_has("2 jobs: 2 succeeded");
}

#[test]
fn appends_the_file_when_the_template_has_no_placeholder() {
    let temp = Project::empty();
    temp.file("only.txt", "data");

    temp.volley()
        .args(&["each", "--files", "*.txt", "--", "wc", "-c"])
        .passes()
        .stdout_has("wc -c only.txt")
        .stdout_has("1 job: 1 succeeded");
}

#[test]
fn placeholder_substitutes_inside_larger_words() {
    let temp = Project::empty();
    temp.file("a.txt", "payload");

    temp.volley().args(&["each", "--files", "*.txt", "--", "cp", "{}", "{}.bak"]).passes();

    let copied = temp.path().join("a.txt.bak");
    assert!(copied.exists(), "cp should have produced {}", copied.display());
}

#[test]
fn no_matches_is_a_usage_error() {
    let temp = Project::empty();
    let result = temp.volley().args(&["each", "--files", "*.nope", "--", "cat", "{}"]).fails();
    assert_eq!(result.code(), Some(2));
    result.stderr_has("no files match");
}

#[test]
fn hidden_files_are_skipped() {
    let temp = Project::empty();
    temp.file("seen.txt", "x");
    temp.file(".hidden.txt", "x");

    temp.volley()
        .args(&["each", "--files", "*.txt", "--", "cat", "{}"])
        .passes()
        .stdout_has("1 job: 1 succeeded");
}

#[test]
fn repeated_patterns_combine_without_duplicates() {
    let temp = Project::empty();
    temp.file("one.txt", "x");
    temp.file("two.md", "y");

    temp.volley()
        .args(&["each", "--files", "*.txt", "--files", "*.md", "--files", "one.*", "--", "cat", "{}"])
        .passes()
        .stdout_has("2 jobs: 2 succeeded");
}

#[test]
fn batch_size_chunks_the_file_list() {
    let temp = Project::empty();
    for name in ["a.txt", "b.txt", "c.txt"] {
        temp.file(name, "x");
    }

    temp.volley()
        .args(&["each", "--files", "*.txt", "--batch-size", "2", "--", "cat", "{}"])
        .passes()
        .stdout_has("3 jobs: 3 succeeded");
}

#[test]
fn failing_files_exit_one_with_their_frames() {
    let temp = Project::empty();
    temp.file("ok.json", "{}");
    temp.file("bad.json", "{broken");

    // grep finds "broken" only in bad.json; ok.json fails the match
    let result = temp
        .volley()
        .args(&["each", "--files", "*.json", "--", "grep", "-q", "broken", "{}"])
        .fails();
    assert_eq!(result.code(), Some(1));
    result.stdout_has("1 succeeded").stdout_has("1 failed");
}
