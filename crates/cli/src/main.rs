// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `volley` — run batches of external commands in parallel.

mod color;
mod commands;
mod env;
mod exit_error;
mod output;
mod table;

use clap::{Parser, Subcommand};

use crate::exit_error::ExitError;

#[derive(Parser)]
#[command(
    name = "volley",
    version,
    about = "Run batches of external commands in parallel",
    styles = color::styles()
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run commands in parallel and wait for the results
    Run(commands::run::RunArgs),
    /// Run a command template once per matching file
    Each(commands::each::EachArgs),
}

/// Log to stderr so command output on stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).compact().init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::handle(args).await,
        Commands::Each(args) => commands::each::handle(args).await,
    };

    if let Err(err) = result {
        match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("error: {:#}", err);
                std::process::exit(2);
            }
        }
    }
}
