//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// infrasync - preview infrastructure changes before applying them.
#[derive(Parser, Debug)]
#[command(name = "infrasync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the desired-state file.
    #[arg(short, long, global = true, env = "INFRASYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Current state source: `mock`, a state file path, or an http(s) URL.
    #[arg(short, long, global = true, env = "INFRASYNC_STATE", default_value = "mock")]
    pub state: String,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare the desired state with the current state and show the plan.
    Plan {
        /// Exit with code 2 when there are changes.
        #[arg(long)]
        detailed_exitcode: bool,
    },

    /// Validate the desired-state file.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Inspect the current state.
    State {
        /// State subcommand.
        #[command(subcommand)]
        command: StateCommands,
    },
}

/// Current-state subcommands.
#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// List the resources of the current state.
    Show,

    /// Save the current state to a JSON state file.
    Pull {
        /// Destination file.
        #[arg(long, default_value = "infrasync.state.json")]
        out: PathBuf,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan() {
        let cli = Cli::try_parse_from([
            "infrasync",
            "--config",
            "infra.yaml",
            "--state",
            "state.json",
            "plan",
            "--detailed-exitcode",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("infra.yaml")));
        assert_eq!(cli.state, "state.json");
        assert!(matches!(
            cli.command,
            Commands::Plan {
                detailed_exitcode: true
            }
        ));
    }

    #[test]
    fn test_parse_state_pull() {
        let cli =
            Cli::try_parse_from(["infrasync", "state", "pull", "--out", "snap.json"]).unwrap();
        match cli.command {
            Commands::State {
                command: StateCommands::Pull { out },
            } => assert_eq!(out, PathBuf::from("snap.json")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
