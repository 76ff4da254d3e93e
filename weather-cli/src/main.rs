//! Binary crate for the `weather-dash` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and the tabbed dashboard
//! - Logging setup

use clap::Parser;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    logging::init_logging(&logging::LogConfig::from_verbosity(cmd.verbose, cmd.log_format));
    cmd.run().await
}
