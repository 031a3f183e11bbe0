//! autotag - automatic audio track tagger.
//!
//! Scans directories for audio files, identifies each track through a
//! recognition service and writes title, artist, album, genre and cover art
//! back into the file.

pub mod cli;
pub mod config;
pub mod cover;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod recognition;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;
pub mod transcode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // RUST_LOG wins; otherwise info for this crate
    let mut filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("autotag=info"))?;
    if args.verbose {
        filter = filter.add_directive("autotag=debug".parse()?);
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args)
}
