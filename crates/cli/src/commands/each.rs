// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! `volley each` — run a command template once per matching file.
//!
//! ```text
//! volley each --files 'src/**/*.rs' -- rustfmt --check {}
//! ```
//!
//! Every `{}` in the template is replaced with the file path; when the
//! template has no placeholder the path is appended as the final argument,
//! xargs-style. Files are matched with glob patterns and processed in
//! sorted order, a chunk at a time.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::Result;
use clap::Args;

use volley_core::CommandSpec;

use crate::exit_error::ExitError;

use super::batch::{self, BatchOpts};

/// Placeholder replaced with the file path in template words.
const PLACEHOLDER: &str = "{}";

#[derive(Args, Debug)]
pub struct EachArgs {
    #[command(flatten)]
    pub batch: BatchOpts,

    /// Glob pattern for input files (repeatable; quote to keep the shell off it)
    #[arg(long = "files", value_name = "PATTERN", required = true)]
    pub files: Vec<String>,

    /// Submit in chunks of this size, waiting chunk by chunk
    #[arg(long, value_name = "N", default_value = "8")]
    pub batch_size: NonZeroUsize,

    /// Command template: `{}` stands for the file; appended when absent
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

pub async fn handle(args: EachArgs) -> Result<()> {
    let files = expand_patterns(&args.files)?;
    if files.is_empty() {
        return Err(ExitError::new(2, format!("no files match {}", args.files.join(", "))).into());
    }
    tracing::debug!(files = files.len(), patterns = args.files.len(), "file patterns expanded");
    let commands = files
        .iter()
        .map(|file| render_template(&args.command, file))
        .collect::<Result<Vec<_>>>()?;
    batch::execute(commands, Some(args.batch_size), &args.batch).await
}

/// Expand every pattern, keeping plain files in sorted order without
/// duplicates. Entries that cannot be read are skipped.
///
/// Hidden files are excluded unless the pattern's filename component
/// itself starts with a dot.
fn expand_patterns(patterns: &[String]) -> Result<Vec<String>> {
    let mut matches: Vec<String> = Vec::new();
    for pattern in patterns {
        let include_hidden = has_hidden_filename(Path::new(pattern));
        let paths = glob::glob(pattern)
            .map_err(|e| ExitError::new(2, format!("bad pattern '{}': {}", pattern, e.msg)))?;
        for entry in paths {
            let Ok(path) = entry else { continue };
            if !path.is_file() {
                continue;
            }
            if !include_hidden && has_hidden_filename(&path) {
                continue;
            }
            matches.push(path.to_string_lossy().into_owned());
        }
    }
    matches.sort();
    matches.dedup();
    Ok(matches)
}

fn has_hidden_filename(path: &Path) -> bool {
    path.file_name().and_then(|f| f.to_str()).map(|f| f.starts_with('.')).unwrap_or(false)
}

/// Instantiate the template for one file.
fn render_template(template: &[String], file: &str) -> Result<CommandSpec> {
    let mut substituted = false;
    let words: Vec<String> = template
        .iter()
        .map(|word| {
            if word.contains(PLACEHOLDER) {
                substituted = true;
                word.replace(PLACEHOLDER, file)
            } else {
                word.clone()
            }
        })
        .collect();
    let Some(mut spec) = CommandSpec::from_argv(words) else {
        return Err(ExitError::new(2, "empty command template").into());
    };
    if !substituted {
        spec = spec.arg(file);
    }
    Ok(spec)
}

#[cfg(test)]
#[path = "each_tests.rs"]
mod tests;
