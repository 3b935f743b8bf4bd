//! Vinyl Scanner - identify a record from a photo of its cover.
//!
//! A photo is checked for completeness and brightness, identified by an
//! external recognition engine, resolved against the Discogs catalog and
//! enriched with Last.fm artist data.

pub mod capture;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod pipeline;
pub mod recognition;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("vinyl_scanner=info".parse()?))
        .init();

    // Try to run a CLI command
    if cli::run_command(&args)? {
        return Ok(());
    }

    // No command specified
    cli::Cli::command().print_help()?;
    println!();
    Ok(())
}
