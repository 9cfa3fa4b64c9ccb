//! Version history commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::types::id::{CodepageId, VersionId};

use crate::output::{self, OutputFormat, VersionRow};
use crate::services::Services;

/// Arguments for the versions command
#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// Versions subcommand
    #[command(subcommand)]
    pub command: VersionsCommand,
}

/// Versions subcommands
#[derive(Debug, Subcommand)]
pub enum VersionsCommand {
    /// Save a snapshot of a codepage
    Save {
        /// Codepage record id
        codepage_id: CodepageId,
        /// Version label
        #[arg(short, long)]
        label: String,
        /// Change description
        #[arg(long, default_value = "")]
        log: String,
        /// Snapshot this file instead of the live code
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List versions of a codepage, newest first
    List {
        /// Codepage record id
        codepage_id: CodepageId,
        /// Maximum number of versions
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show one version
    Show {
        /// Version record id
        version_id: VersionId,
        /// Print only the code snapshot
        #[arg(long)]
        code: bool,
    },
}

/// Arguments for rollback
#[derive(Debug, Args)]
pub struct RollbackArgs {
    /// Codepage record id
    pub codepage_id: CodepageId,
    /// Version record id to restore
    pub version_id: VersionId,
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
    /// Save the live code as a version before restoring
    #[arg(long)]
    pub snapshot_first: bool,
}

/// Execute versions subcommands
pub async fn execute(args: &VersionsArgs, services: &Services, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        VersionsCommand::Save {
            codepage_id,
            label,
            log,
            file,
        } => {
            let id = match file {
                Some(path) => {
                    let code = super::read_file(path).await?;
                    services
                        .versions
                        .save_version(*codepage_id, label, &code, log)
                        .await?
                }
                None => {
                    services
                        .versions
                        .snapshot_current(*codepage_id, label, log)
                        .await?
                }
            };
            output::print_success(&format!(
                "Saved version {id} ('{label}') of codepage {codepage_id}"
            ));
        }
        VersionsCommand::List { codepage_id, limit } => {
            let versions = services.versions.list_versions(*codepage_id, *limit).await?;
            let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
            output::print_list(&rows, format);
        }
        VersionsCommand::Show { version_id, code } => {
            let version = services.versions.get_version(*version_id).await?;
            if *code {
                print!("{}", version.code_snapshot);
            } else {
                output::print_version(&version, format);
            }
        }
    }
    Ok(())
}

/// Execute rollback
pub async fn rollback(args: &RollbackArgs, services: &Services) -> AppResult<()> {
    if !args.yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Replace the live code of codepage {} with version {}?",
                args.codepage_id, args.version_id
            ))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if args.snapshot_first {
        let label = format!("pre-rollback-{}", args.version_id);
        let saved = services
            .versions
            .snapshot_current(args.codepage_id, &label, "Automatic snapshot before rollback")
            .await?;
        output::print_kv("Snapshot", &saved.to_string());
    }

    let restored = services
        .versions
        .rollback(args.codepage_id, args.version_id)
        .await?;
    output::print_success(&format!(
        "Codepage {} restored to version {} ('{}')",
        args.codepage_id, restored.id, restored.version_label
    ));
    Ok(())
}
