//! # synschema CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Each handler returns its own exit code; a handler error is a setup
//! failure, reported with the code that subcommand reserves for it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use synschema_cli::lint::run_lint;
use synschema_cli::{exit_code, CommandKind};
use synschema_cli::normalize::{run_normalize, NormalizeArgs};
use synschema_cli::qc::{run_qc_command, QcArgs};
use synschema_cli::validate::{run_validate, ValidateArgs};

/// Governance toolkit for the synesthetic JSON Schema family.
///
/// Normalizes and lints the schema store, validates examples, and runs the
/// examples QA gate.
#[derive(Parser, Debug)]
#[command(name = "synschema", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Repository root. Discovered from the working directory when omitted.
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize schema files, or verify them with --check.
    Normalize(NormalizeArgs),

    /// Check $id uniqueness and $ref resolution across the schema store.
    Lint,

    /// Validate examples against the schema each one claims.
    Validate(ValidateArgs),

    /// Run the examples QA gate and write reports to meta/output/.
    Qc(QcArgs),
}

impl Commands {
    fn kind(&self) -> CommandKind {
        match self {
            Self::Normalize(_) => CommandKind::Normalize,
            Self::Lint => CommandKind::Lint,
            Self::Validate(_) => CommandKind::Validate,
            Self::Qc(_) => CommandKind::Qc,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let repo_root = cli.root.clone().unwrap_or_else(|| {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        synschema_cli::find_repo_root(&cwd).unwrap_or_else(|| {
            tracing::warn!("Could not locate repository root; using current directory");
            cwd
        })
    });

    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let result = match &cli.command {
        Commands::Normalize(args) => run_normalize(args, &repo_root),
        Commands::Lint => run_lint(&repo_root),
        Commands::Validate(args) => run_validate(args, &repo_root),
        Commands::Qc(args) => run_qc_command(args, &repo_root),
    };

    ExitCode::from(exit_code(cli.command.kind(), result))
}
