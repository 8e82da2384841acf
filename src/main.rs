// SPDX-License-Identifier: GPL-3.0-only

use clap::Parser;
use std::process::ExitCode;
use tracing::error;

mod cli;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let config = cli.resolve();

    // Initialize logging
    // RUST_LOG wins; otherwise info, or debug with --verbose
    // Examples: RUST_LOG=debug, RUST_LOG=snapcam=trace
    let verbose = cli.verbose || config.as_ref().is_ok_and(|c| c.verbose);
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    match config {
        Ok(config) => cli::run(config),
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            ExitCode::FAILURE
        }
    }
}
