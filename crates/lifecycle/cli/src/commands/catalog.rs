//! Stage catalog commands

use crate::error::CliResult;
use crate::output::{self, join_cell, print_success, OutputFormat};
use clap::Subcommand;
use lifecycle_engine::{CatalogRegistry, StageCatalog};
use lifecycle_types::{EntityKind, StageId};
use serde::Serialize;
use tabled::Tabled;

/// Catalog subcommands
#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Validate every configured catalog
    Validate,

    /// List catalogs by entity kind
    List,

    /// Show the stages and transitions of one catalog
    Show {
        /// Entity kind (contract, lead, execution_plan)
        kind: EntityKind,
    },
}

/// Table row for catalog summaries
#[derive(Debug, Serialize, Tabled)]
struct CatalogRow {
    kind: String,
    initial: String,
    stages: usize,
    gated: usize,
    terminal: String,
}

impl From<&StageCatalog> for CatalogRow {
    fn from(catalog: &StageCatalog) -> Self {
        let terminal: Vec<String> = catalog
            .terminal_stages()
            .iter()
            .map(|s| s.id.to_string())
            .collect();
        Self {
            kind: catalog.kind().to_string(),
            initial: catalog.initial_stage().to_string(),
            stages: catalog.stage_count(),
            gated: catalog.stages().iter().filter(|s| s.is_gated()).count(),
            terminal: join_cell(&terminal),
        }
    }
}

/// Table row for one stage
#[derive(Debug, Serialize, Tabled)]
struct StageRow {
    #[tabled(rename = "#")]
    ordinal: usize,
    stage: String,
    terminal: bool,
    gate: String,
    next: String,
}

fn stage_rows(catalog: &StageCatalog) -> Vec<StageRow> {
    catalog
        .stages()
        .iter()
        .map(|stage| {
            let gate = stage
                .gate
                .as_ref()
                .map(|g| g.required_items.clone())
                .unwrap_or_default();
            let next: Vec<String> = catalog
                .transitions_from(&stage.id)
                .iter()
                .map(StageId::to_string)
                .collect();
            StageRow {
                ordinal: stage.ordinal,
                stage: stage.id.to_string(),
                terminal: stage.terminal,
                gate: join_cell(&gate),
                next: join_cell(&next),
            }
        })
        .collect()
}

/// Execute a catalog command
pub fn execute(
    command: CatalogCommands,
    registry: &CatalogRegistry,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        CatalogCommands::Validate => {
            for catalog in registry.iter() {
                print_success(&format!(
                    "{} catalog is valid ({} stages, {} transitions)",
                    catalog.kind(),
                    catalog.stage_count(),
                    catalog.transitions().len()
                ));
            }
            Ok(())
        }

        CatalogCommands::List => {
            let rows: Vec<CatalogRow> = registry.iter().map(CatalogRow::from).collect();
            output::print_output(rows, format)
        }

        CatalogCommands::Show { kind } => {
            let catalog = registry.catalog(kind)?;
            output::print_output(stage_rows(catalog), format)
        }
    }
}
