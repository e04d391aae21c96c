// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

use super::*;
use serial_test::serial;

fn render_plain(table: &Table) -> String {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");
    let mut buf = Vec::new();
    table.render(&mut buf);
    String::from_utf8(buf).unwrap()
}

#[test]
#[serial]
fn columns_align_to_widest_cell() {
    let mut table = Table::new(vec![Column::left("ID"), Column::left("STATE")]);
    table.row(vec!["a".into(), "running".into()]);
    table.row(vec!["longer-id".into(), "done".into()]);

    let out = render_plain(&table);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "ID         STATE");
    assert_eq!(lines[1], "a          running");
    assert_eq!(lines[2], "longer-id  done");
}

#[test]
#[serial]
fn header_counts_toward_column_width() {
    let mut table = Table::new(vec![Column::left("COMMAND"), Column::left("T")]);
    table.row(vec!["ls".into(), "1s".into()]);

    let out = render_plain(&table);
    assert!(out.lines().next().unwrap().starts_with("COMMAND  "));
    assert!(out.contains("ls       1s"));
}

#[test]
#[serial]
fn short_rows_render_empty_cells() {
    let mut table = Table::new(vec![Column::left("A"), Column::left("B")]);
    table.row(vec!["only".into()]);

    let out = render_plain(&table);
    assert_eq!(out.lines().nth(1).unwrap(), "only");
}

#[test]
#[serial]
fn status_cells_are_colored_when_forced() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");

    let mut table = Table::new(vec![Column::status("STATUS")]);
    table.row(vec!["failed (exit 3)".into()]);

    let mut buf = Vec::new();
    table.render(&mut buf);
    let out = String::from_utf8(buf).unwrap();
    assert!(out.contains("\x1b[38;5;167m"), "status column should color by state: {out:?}");
}

#[test]
#[serial]
fn literal_cells_use_the_literal_color_when_forced() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");

    let mut table = Table::new(vec![Column::literal("COMMAND")]);
    table.row(vec!["echo hi".into()]);

    let mut buf = Vec::new();
    table.render(&mut buf);
    let out = String::from_utf8(buf).unwrap();
    assert!(out.contains("\x1b[38;5;250m"), "command column should be literal-colored: {out:?}");
}
