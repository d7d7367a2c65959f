//! Binary crate for the `weather-today` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Asking for location consent and interactive configuration
//! - Rendering the weather screen in the terminal

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

/// Logs go to stderr so they never interleave with the rendered screen.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
