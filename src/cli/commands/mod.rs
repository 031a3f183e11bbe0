//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `tag`: batch recognition and tagging of whole directories
//! - `inspect`: single-file identify/show and tool checks

mod inspect;
mod tag;

use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::config::{
    Config, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS, DEFAULT_WORKERS,
    RecognitionConfig, RetryPolicy,
};
use crate::error::{self, Error, ResultExt};

pub use inspect::{cmd_check_tools, cmd_identify, cmd_show};
pub use tag::cmd_tag;

/// Environment variable holding the recognition endpoint
pub(crate) const RECOGNITION_URL_ENV: &str = "AUTOTAG_RECOGNITION_URL";
/// Environment variable holding the recognition API key
pub(crate) const API_KEY_ENV: &str = "AUTOTAG_API_KEY";

/// Automatic audio track tagger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log per-step detail (same as RUST_LOG=autotag=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recognize and tag every track in one or more directories
    Tag(TagArgs),
    /// Recognize one file and print what would be written
    Identify {
        /// Path to the audio file
        path: PathBuf,
        #[command(flatten)]
        recognition: RecognitionArgs,
    },
    /// Print the tags currently stored in a file
    Show {
        /// Path to the audio file
        path: PathBuf,
    },
    /// Check if external tools and settings are in place
    CheckTools,
}

/// Arguments of the `tag` command
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Directory to scan (repeatable; only its direct children are tagged)
    #[arg(short = 'd', long = "dir", required = true)]
    pub dirs: Vec<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// File extension to pick up (repeatable)
    #[arg(long = "extension", default_value = "mp3")]
    pub extensions: Vec<String>,

    #[command(flatten)]
    pub recognition: RecognitionArgs,
}

/// Recognition service and retry settings shared by `tag` and `identify`
#[derive(Args, Debug)]
pub struct RecognitionArgs {
    /// Recognition endpoint URL
    #[arg(long, env = RECOGNITION_URL_ENV)]
    pub recognition_url: Option<String>,

    /// API key sent to the recognition endpoint
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Recognition attempts per track
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub attempts: u32,

    /// Seconds before a single recognition attempt is abandoned
    #[arg(long, default_value_t = DEFAULT_ATTEMPT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = DEFAULT_BACKOFF.as_secs())]
    pub backoff_secs: u64,
}

impl RecognitionArgs {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.attempts,
            attempt_timeout: Duration::from_secs(self.timeout_secs),
            backoff: Duration::from_secs(self.backoff_secs),
        }
    }

    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            endpoint: self.recognition_url.clone(),
            api_key: self.api_key.clone(),
            ..Default::default()
        }
    }
}

impl TagArgs {
    /// Build the run configuration. Not validated yet.
    pub fn config(&self) -> Config {
        Config {
            workers: self.workers,
            retry: self.recognition.retry_policy(),
            recognition: self.recognition.recognition_config(),
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }
}

/// Run the parsed CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Tag(args) => {
            let rt = Runtime::new()?;
            cmd_tag(&rt, args)
        }
        Commands::Identify { path, recognition } => {
            let rt = Runtime::new()?;
            cmd_identify(&rt, path, recognition)
        }
        Commands::Show { path } => cmd_show(path),
        Commands::CheckTools => cmd_check_tools(),
    }
}

/// Fail early with a readable error when `path` is not a regular file.
pub(crate) fn require_file(path: &Path) -> error::Result<()> {
    let meta = match std::fs::metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::not_found(path)),
        other => other.with_context(format!("Cannot read {}", path.display()))?,
    };
    if !meta.is_file() {
        return Err(Error::not_found(path));
    }
    Ok(())
}
