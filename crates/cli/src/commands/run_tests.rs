// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

use super::*;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn single_command_is_one_group() {
    let specs = split_groups(&words(&["echo", "hello", "world"]), None).unwrap();

    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].program, "echo");
    assert_eq!(specs[0].args, vec!["hello", "world"]);
}

#[test]
fn separator_splits_into_multiple_commands() {
    let specs =
        split_groups(&words(&["cargo", "check", ":::", "cargo", "fmt", "--check"]), None).unwrap();

    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].line(), "cargo check");
    assert_eq!(specs[1].line(), "cargo fmt --check");
}

#[test]
fn separator_must_be_a_standalone_word() {
    let specs = split_groups(&words(&["echo", ":::x", "::"]), None).unwrap();

    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].args, vec![":::x", "::"]);
}

#[test]
fn cwd_applies_to_every_group() {
    let dir = Path::new("/tmp/somewhere");
    let specs = split_groups(&words(&["pwd", ":::", "ls"]), Some(dir)).unwrap();

    assert!(specs.iter().all(|s| s.cwd.as_deref() == Some(dir)));
}

#[test]
fn empty_group_is_a_usage_error() {
    let err = split_groups(&words(&["echo", "hi", ":::"]), None).unwrap_err();

    let exit = err.downcast_ref::<ExitError>().unwrap();
    assert_eq!(exit.code, 2);
    assert!(exit.message.contains(":::"));
}

#[test]
fn lone_separator_is_a_usage_error() {
    assert!(split_groups(&words(&[":::"]), None).is_err());
}
