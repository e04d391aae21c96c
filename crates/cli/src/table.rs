// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Minimal aligned-column table rendering for list output.
//!
//! Widths are computed on the plain cell text and color is applied after
//! padding, so ANSI escapes never skew the alignment.

use std::io::Write;

use crate::color;

enum Paint {
    /// Plain text
    Left,
    /// Command text, rendered in the literal color
    Literal,
    /// Secondary text, rendered muted (ids, timestamps)
    Muted,
    /// Job state words, colored by meaning
    Status,
}

pub struct Column {
    header: &'static str,
    paint: Paint,
}

impl Column {
    pub fn left(header: &'static str) -> Self {
        Self { header, paint: Paint::Left }
    }

    pub fn literal(header: &'static str) -> Self {
        Self { header, paint: Paint::Literal }
    }

    pub fn muted(header: &'static str) -> Self {
        Self { header, paint: Paint::Muted }
    }

    pub fn status(header: &'static str) -> Self {
        Self { header, paint: Paint::Status }
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Add one row; missing trailing cells render empty.
    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn render(&self, out: &mut dyn Write) {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(col.header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, width)| color::context(&pad(col.header, *width)))
            .collect();
        let _ = writeln!(out, "{}", header.join("  ").trim_end());

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (col, width))| {
                    let text = row.get(i).map(String::as_str).unwrap_or("");
                    let padded = pad(text, *width);
                    match col.paint {
                        Paint::Left => padded,
                        Paint::Literal => color::literal(&padded),
                        Paint::Muted => color::muted(&padded),
                        Paint::Status => color::status(&padded),
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        }
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut out = text.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    out
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
