//! Export and import commands.

use std::path::PathBuf;

use clap::Args;

use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::types::id::CodepageId;
use codepage_entity::validation::ValidationOptions;
use codepage_service::Format;
use codepage_service::codec;

use crate::output::{self, OutputFormat};
use crate::services::Services;

/// Arguments for export
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Codepage record id
    pub id: CodepageId,
    /// Export format: raw, structured or human_readable
    #[arg(long = "as")]
    pub as_format: Option<Format>,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    /// Explicit format, else the output file extension, else raw.
    fn resolved_format(&self) -> Format {
        self.as_format
            .or_else(|| self.output.as_deref().and_then(Format::from_path))
            .unwrap_or(Format::Raw)
    }
}

/// Arguments for import
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// File to import
    pub file: PathBuf,
    /// Input format; detected from the extension or content when omitted
    #[arg(long = "as")]
    pub as_format: Option<Format>,
    /// Name for raw source without a title
    #[arg(short, long)]
    pub name: Option<String>,
    /// Parse and validate without deploying
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute export
pub async fn export(args: &ExportArgs, services: &Services) -> AppResult<()> {
    let cp = services
        .codepages
        .get(services.codepage_collection(), args.id)
        .await?;
    let format = args.resolved_format();
    let text = codec::export(&cp, format)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, text).await.map_err(|e| {
                AppError::internal(format!("Cannot write '{}': {e}", path.display()))
            })?;
            output::print_success(&format!(
                "Exported codepage {} as {format} to {}",
                args.id,
                path.display()
            ));
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Execute import
pub async fn import(args: &ImportArgs, services: &Services, format: OutputFormat) -> AppResult<()> {
    let text = super::read_file(&args.file).await?;
    let input_format = args.as_format.or_else(|| Format::from_path(&args.file));
    let draft = codec::import(&text, input_format, args.name.as_deref())?;

    if args.dry_run {
        output::print_kv("Name", &draft.name);
        output::print_kv("Tags", &draft.tags.join(", "));
        output::print_kv("Active", &draft.active.to_string());
        let report = services.validator.validate(&draft.code, &ValidationOptions::default());
        output::print_report(&report, format);
        return Ok(());
    }

    let id = services
        .codepages
        .deploy(services.codepage_collection(), &draft)
        .await?;
    output::print_success(&format!("Imported '{}' as codepage {id}", draft.name));
    Ok(())
}
