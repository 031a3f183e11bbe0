//! Command-line interface for autotag.
//!
//! This module provides the `tag` batch run plus a few single-file commands
//! for inspecting what the recognizer and the tag writer see.

mod commands;

pub use commands::{Cli, Commands, run_command};
