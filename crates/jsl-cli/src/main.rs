//! # jsl CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jsl_cli::config::{load_config, LintConfig};
use jsl_cli::lint::{run_lint, LintArgs};
use jsl_cli::validate::{run_validate, ValidateArgs};

/// JSON Schema linter and validator.
///
/// Reports and fixes anti-patterns in JSON Schema documents, and validates
/// instances against schemas. Never accesses the network: referenced
/// schemas and custom metaschemas are loaded from `--resolve` paths.
#[derive(Parser, Debug)]
#[command(name = "jsl", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report anti-patterns in schema documents, optionally fixing them.
    Lint(LintArgs),

    /// Validate instance documents against a schema.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Reports go to stdout.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("jsl CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{e:#}");
                return ExitCode::from(2);
            }
        },
        None => LintConfig::default(),
    };

    let result = match cli.command {
        Commands::Lint(args) => run_lint(&args, &config),
        Commands::Validate(args) => run_validate(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
