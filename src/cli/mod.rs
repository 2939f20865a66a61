//! CLI module for the infrasync plan tool.
//!
//! This module provides the command-line interface and the presenter
//! that renders computed diffs.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, StateCommands};
pub use output::OutputFormatter;
