//! infrasync CLI entrypoint.
//!
//! This is the main entrypoint for the infrasync command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use infrasync::cli::{Cli, Commands, OutputFormatter, StateCommands};
use infrasync::config::{
    ConfigHasher, ConfigParser, ConfigValidator, SyncConfig, find_config_file,
};
use infrasync::error::Result;
use infrasync::planner::DiffEngine;
use infrasync::state::{FileStateProvider, StateProvider, StateSource};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit code reported by `plan --detailed-exitcode` when changes exist.
const EXIT_CHANGES_PRESENT: u8 = 2;

/// Environment variable holding the bearer token for HTTP state sources.
const STATE_TOKEN_VAR: &str = "INFRASYNC_STATE_TOKEN";

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Plan { detailed_exitcode } => {
            cmd_plan(cli.config.as_ref(), &cli.state, detailed_exitcode, &formatter).await
        }
        Commands::Validate { warnings } => {
            cmd_validate(cli.config.as_ref(), warnings, &formatter)
        }
        Commands::State { command } => {
            cmd_state(cli.config.as_ref(), &cli.state, command, &formatter)
                .await
                .map(|()| ExitCode::SUCCESS)
        }
    }
}

/// Show the change plan.
async fn cmd_plan(
    config_path: Option<&PathBuf>,
    state_source: &str,
    detailed_exitcode: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    // Desired state
    let desired = load_config(config_path)?;

    // Current state
    let provider = create_provider(state_source)?;
    let current = provider.fetch().await?;

    // Compute diff
    let diff = DiffEngine::new().compare_states(&current.resources, &desired.resources);
    let config_hash = ConfigHasher::new().hash_config(&desired);
    debug!("Computed {} resource changes", diff.changes.len());

    // Output
    let output = formatter.format_plan(&diff, &config_hash);
    emit(&output);

    if detailed_exitcode && diff.has_changes() {
        return Ok(ExitCode::from(EXIT_CHANGES_PRESENT));
    }
    Ok(ExitCode::SUCCESS)
}

/// Validate configuration.
fn cmd_validate(
    config_path: Option<&PathBuf>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(config_dir(&config_file));
    parser.load_dotenv()?;
    let config = parser.load_file(&config_file)?;

    let result = ConfigValidator::new().check(&config);
    emit(&formatter.format_validation(&config, &result, show_warnings));

    // The report already lists every error
    match result.into_result() {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            debug!("Validation failed: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Current-state commands.
async fn cmd_state(
    config_path: Option<&PathBuf>,
    state_source: &str,
    command: StateCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    // Pick up a .env next to the config file if there is one
    if let Ok(config_file) = resolve_config_path(config_path) {
        ConfigParser::new()
            .with_base_path(config_dir(&config_file))
            .load_dotenv()?;
    }

    let provider = create_provider(state_source)?;
    let state = provider.fetch().await?;

    match command {
        StateCommands::Show => {
            emit(&formatter.format_state(&state, state_source));
        }
        StateCommands::Pull { out } => {
            let snapshot = FileStateProvider::new(out);
            snapshot.save(&state).await?;
            eprintln!(
                "Saved {} resources from {} to {}",
                state.resources.len(),
                provider.provider_type(),
                snapshot.path().display()
            );
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Directory holding the configuration file.
fn config_dir(config_file: &Path) -> &Path {
    config_file.parent().unwrap_or_else(|| Path::new("."))
}

/// Loads and validates the desired state.
fn load_config(config_path: Option<&PathBuf>) -> Result<SyncConfig> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(config_dir(&config_file));
    parser.load_dotenv()?;

    let config = parser.load_file(&config_file)?;
    let result = ConfigValidator::new().validate(&config)?;
    for warning in &result.warnings {
        debug!("Validation warning: {warning}");
    }

    Ok(config)
}

/// Creates the current-state provider for a source string.
fn create_provider(source: &str) -> Result<Box<dyn StateProvider>> {
    let source: StateSource = source.parse()?;
    let token = std::env::var(STATE_TOKEN_VAR).ok();
    source.create_provider(token.as_deref())
}

/// Writes rendered output for the user.
fn emit(output: &str) {
    println!("{output}");
}
