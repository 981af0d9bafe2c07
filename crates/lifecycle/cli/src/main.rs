//! Lifecycle CLI - inspect stage catalogs, gates, plan progress and timelines
//!
//! This CLI gives operators a terminal view of the lifecycle configuration:
//! - Validate and print stage catalogs
//! - Preview whether a stage's checklist gate would pass
//! - Dry-run a path of transitions for an entity kind
//! - Compute plan progress and timeline layout from plan files

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lifecycle_engine::{LifecycleConfig, LifecycleService};
use lifecycle_types::EntityKind;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::{catalog, gate, plan, simulate};
use error::CliResult;

/// Lifecycle CLI application
#[derive(Parser)]
#[command(name = "lifecycle")]
#[command(about = "Stage lifecycle and plan timeline tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML or YAML)
    #[arg(short, long, env = "LIFECYCLE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Stage catalogs
    Catalog {
        #[command(subcommand)]
        command: catalog::CatalogCommands,
    },

    /// Check a stage's checklist gate
    Gate {
        /// Entity kind (contract, lead, execution_plan)
        kind: EntityKind,

        /// Stage to evaluate
        stage: String,

        /// Completed checklist items
        #[arg(long, value_delimiter = ',')]
        completed: Vec<String>,
    },

    /// Walk a new entity through a list of stages
    #[command(alias = "sim")]
    Simulate {
        /// Entity kind (contract, lead, execution_plan)
        kind: EntityKind,

        /// Stages to move through, in order
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<String>,

        /// Checklist items treated as complete at every gate
        #[arg(long, value_delimiter = ',')]
        completed: Vec<String>,
    },

    /// Plan progress from a JSON or YAML plan file
    Progress {
        /// Plan file
        plan: PathBuf,
    },

    /// Timeline layout of a plan file
    Layout {
        /// Plan file
        plan: PathBuf,

        /// Date used for the "today" marker (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn run(cli: Cli) -> CliResult<()> {
    let config = LifecycleConfig::load(cli.config.as_deref())?;
    let service = LifecycleService::from_config(&config)?;
    let format = cli.output;

    match cli.command {
        Commands::Catalog { command } => catalog::execute(command, service.catalogs(), format),
        Commands::Gate {
            kind,
            stage,
            completed,
        } => gate::execute(&service, kind, &stage, &completed, format),
        Commands::Simulate {
            kind,
            path,
            completed,
        } => simulate::execute(&service, kind, &path, &completed, format),
        Commands::Progress { plan: file } => plan::progress(&service, &file, format),
        Commands::Layout { plan: file, today } => plan::layout(&service, &file, today, format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
