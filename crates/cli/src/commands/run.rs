// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! `volley run` — run explicit commands in parallel.
//!
//! Everything after `--` is taken verbatim as argument vectors, with `:::`
//! separating commands. No shell ever sees the words, so there is nothing
//! to quote or escape:
//!
//! ```text
//! volley run -- cargo check ::: cargo fmt --check ::: cargo doc
//! ```

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use volley_core::CommandSpec;

use crate::exit_error::ExitError;

use super::batch::{self, BatchOpts};

/// Separator between command groups after `--`.
const GROUP_SEPARATOR: &str = ":::";

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub batch: BatchOpts,

    /// Submit in chunks of this size, waiting chunk by chunk (default: all at once)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<NonZeroUsize>,

    /// Working directory for every command
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Commands to run: everything after `--`, with `:::` between commands
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

pub async fn handle(args: RunArgs) -> Result<()> {
    let commands = split_groups(&args.command, args.cwd.as_deref())?;
    batch::execute(commands, args.batch_size, &args.batch).await
}

/// Split the raw words after `--` into one command per `:::` group.
fn split_groups(words: &[String], cwd: Option<&Path>) -> Result<Vec<CommandSpec>> {
    let mut specs = Vec::new();
    for group in words.split(|w| w == GROUP_SEPARATOR) {
        let Some(mut spec) = CommandSpec::from_argv(group.iter().cloned()) else {
            return Err(ExitError::new(2, "empty command (check stray ':::' separators)").into());
        };
        if let Some(dir) = cwd {
            spec = spec.cwd(dir.to_path_buf());
        }
        specs.push(spec);
    }
    Ok(specs)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
