// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// dramtag — Whisky label generator
//
// Entry point. Initialises logging, loads configuration, builds the resolver
// and renderer, and runs one command.

mod cli;
mod commands;
mod services;

use std::process::ExitCode;

use clap::Parser;
use dramtag_core::human_errors::humanize_error;

use cli::Cli;
use services::context::AppContext;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "dramtag starting");

    let outcome = match AppContext::init(cli.config.as_deref(), cli.offline) {
        Ok(ctx) => commands::dispatch(&ctx, cli.command, cli.json).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            let human = humanize_error(&e);
            eprintln!("error: {}", human.message);
            eprintln!("hint:  {}", human.suggestion);
            ExitCode::from(u8::try_from(human.severity.exit_code()).unwrap_or(1))
        }
    }
}
