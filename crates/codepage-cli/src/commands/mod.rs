//! CLI command definitions and dispatch.

pub mod codepage;
pub mod transfer;
pub mod validate;
pub mod version;

use std::path::Path;

use clap::{Parser, Subcommand};

use codepage_core::config::AppConfig;
use codepage_core::error::AppError;
use codepage_core::result::AppResult;

use crate::output::OutputFormat;
use crate::services::Services;

/// Codepage Hub: manage, validate and version codepages in a remote record store
#[derive(Debug, Parser)]
#[command(name = "codepage", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    pub config: String,

    /// Configuration environment overlay (config/{env}.toml)
    #[arg(short, long, global = true, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Statically validate a source file
    Validate(validate::ValidateArgs),
    /// Deploy a new codepage
    Deploy(codepage::DeployArgs),
    /// Update fields of a codepage
    Update(codepage::UpdateArgs),
    /// Show one codepage
    Get(codepage::GetArgs),
    /// List recent codepages
    List(codepage::ListArgs),
    /// Search codepages
    Search(codepage::SearchArgs),
    /// Clone a codepage under a new name
    Clone(codepage::CloneArgs),
    /// Mark a codepage active
    Activate(codepage::IdArg),
    /// Mark a codepage inactive
    Deactivate(codepage::IdArg),
    /// Export a codepage to a file or stdout
    Export(transfer::ExportArgs),
    /// Import a codepage from a file
    Import(transfer::ImportArgs),
    /// Version history
    Versions(version::VersionsArgs),
    /// Restore a saved version into the live codepage
    Rollback(version::RollbackArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Validate(args) => validate::execute(args, self.format).await,
            Commands::Deploy(args) => codepage::deploy(args, &connect(config)?, self.format).await,
            Commands::Update(args) => codepage::update(args, &connect(config)?).await,
            Commands::Get(args) => codepage::get(args, &connect(config)?, self.format).await,
            Commands::List(args) => codepage::list(args, &connect(config)?, self.format).await,
            Commands::Search(args) => codepage::search(args, &connect(config)?, self.format).await,
            Commands::Clone(args) => codepage::clone(args, &connect(config)?).await,
            Commands::Activate(args) => codepage::set_active(args, &connect(config)?, true).await,
            Commands::Deactivate(args) => {
                codepage::set_active(args, &connect(config)?, false).await
            }
            Commands::Export(args) => transfer::export(args, &connect(config)?).await,
            Commands::Import(args) => transfer::import(args, &connect(config)?, self.format).await,
            Commands::Versions(args) => version::execute(args, &connect(config)?, self.format).await,
            Commands::Rollback(args) => version::rollback(args, &connect(config)?).await,
        }
    }
}

/// Helper: wire services from configuration
fn connect(config: &AppConfig) -> AppResult<Services> {
    Services::from_config(config)
}

/// Helper: read a source file
pub(crate) async fn read_file(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::validation(format!("Cannot read '{}': {e}", path.display())))
}
