//! Lifecycle commands: deploy, update, get, list, search, clone, activation.

use std::path::PathBuf;

use clap::Args;

use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::types::id::CodepageId;
use codepage_entity::codepage::{CodepageDraft, CodepagePatch};
use codepage_entity::validation::ValidationOptions;
use codepage_service::{DeployOutcome, SearchRequest};

use crate::output::{self, CodepageRow, OutputFormat};
use crate::services::Services;

/// A codepage id argument
#[derive(Debug, Args)]
pub struct IdArg {
    /// Codepage record id
    pub id: CodepageId,
}

/// Arguments for deploy
#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Codepage name
    #[arg(short, long)]
    pub name: String,
    /// File holding the code
    #[arg(long)]
    pub file: PathBuf,
    /// Description
    #[arg(long)]
    pub description: Option<String>,
    /// Version string
    #[arg(id = "set_version", long = "set-version")]
    pub version: Option<String>,
    /// Comma-separated tags
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
    /// Dependency URI (repeatable)
    #[arg(long = "dependency")]
    pub dependencies: Vec<String>,
    /// Target table id
    #[arg(long)]
    pub target_table: Option<String>,
    /// Create the codepage inactive
    #[arg(long)]
    pub inactive: bool,
    /// Deploy without running validation first
    #[arg(long)]
    pub skip_validation: bool,
}

/// Arguments for update
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Codepage record id
    pub id: CodepageId,
    /// New name
    #[arg(short, long)]
    pub name: Option<String>,
    /// File holding the new code
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// New version string
    #[arg(id = "set_version", long = "set-version")]
    pub version: Option<String>,
    /// Replacement comma-separated tags
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
    /// Replacement target table id
    #[arg(long)]
    pub target_table: Option<String>,
}

/// Arguments for get
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Codepage record id
    pub id: CodepageId,
    /// Print only the code
    #[arg(long)]
    pub code: bool,
}

/// Arguments for list
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Maximum number of codepages
    #[arg(short, long, default_value_t = 20)]
    pub limit: u32,
}

/// Arguments for search
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to find in name or description
    pub term: Option<String>,
    /// Required tags, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
    /// Target table id
    #[arg(long)]
    pub target_table: Option<String>,
    /// Include inactive codepages
    #[arg(long)]
    pub include_inactive: bool,
    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<u32>,
}

/// Arguments for clone
#[derive(Debug, Args)]
pub struct CloneArgs {
    /// Source codepage record id
    pub id: CodepageId,
    /// Name of the copy
    #[arg(short, long)]
    pub name: String,
    /// Description override
    #[arg(long)]
    pub description: Option<String>,
    /// Version override
    #[arg(id = "set_version", long = "set-version")]
    pub version: Option<String>,
    /// Target table override
    #[arg(long)]
    pub target_table: Option<String>,
    /// Create the copy inactive
    #[arg(long)]
    pub inactive: bool,
}

/// Execute deploy
pub async fn deploy(args: &DeployArgs, services: &Services, format: OutputFormat) -> AppResult<()> {
    let code = super::read_file(&args.file).await?;
    let draft = CodepageDraft {
        description: args.description.clone(),
        version: args.version.clone(),
        tags: args.tags.clone(),
        dependencies: args.dependencies.clone(),
        target_table_id: args.target_table.clone(),
        active: !args.inactive,
        ..CodepageDraft::new(args.name.clone(), code)
    };
    let collection = services.codepage_collection();

    if args.skip_validation {
        let id = services.codepages.deploy(collection, &draft).await?;
        output::print_success(&format!("Deployed codepage {id}"));
        return Ok(());
    }

    match services
        .codepages
        .deploy_validated(collection, &draft, &ValidationOptions::default())
        .await?
    {
        DeployOutcome::Deployed { id, report } => {
            for warning in &report.warnings {
                output::print_warning(warning);
            }
            output::print_success(&format!("Deployed codepage {id}"));
            Ok(())
        }
        DeployOutcome::Blocked(report) => {
            output::print_report(&report, format);
            Err(AppError::validation(format!(
                "Deploy blocked by validation: {} blocking finding(s)",
                report.blocking_findings().count()
            )))
        }
    }
}

/// Execute update
pub async fn update(args: &UpdateArgs, services: &Services) -> AppResult<()> {
    let code = match &args.file {
        Some(path) => Some(super::read_file(path).await?),
        None => None,
    };
    let patch = CodepagePatch {
        name: args.name.clone(),
        code,
        description: args.description.clone(),
        version: args.version.clone(),
        tags: args.tags.clone(),
        dependencies: None,
        target_table_id: args.target_table.clone(),
        active: None,
    };

    services
        .codepages
        .update(services.codepage_collection(), args.id, &patch)
        .await?;
    output::print_success(&format!("Updated codepage {}", args.id));
    Ok(())
}

/// Execute get
pub async fn get(args: &GetArgs, services: &Services, format: OutputFormat) -> AppResult<()> {
    let cp = services
        .codepages
        .get(services.codepage_collection(), args.id)
        .await?;
    if args.code {
        print!("{}", cp.code);
    } else {
        output::print_codepage(&cp, format);
    }
    Ok(())
}

/// Execute list
pub async fn list(args: &ListArgs, services: &Services, format: OutputFormat) -> AppResult<()> {
    let found = services
        .codepages
        .list(services.codepage_collection(), args.limit)
        .await?;
    let rows: Vec<CodepageRow> = found.iter().map(CodepageRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Execute search
pub async fn search(args: &SearchArgs, services: &Services, format: OutputFormat) -> AppResult<()> {
    let request = SearchRequest {
        term: args.term.clone(),
        tags: args.tags.clone(),
        target_table_id: args.target_table.clone(),
        active_only: !args.include_inactive,
        limit: args.limit,
    };
    let found = services
        .codepages
        .search(services.codepage_collection(), &request)
        .await?;
    let rows: Vec<CodepageRow> = found.iter().map(CodepageRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Execute clone
pub async fn clone(args: &CloneArgs, services: &Services) -> AppResult<()> {
    let modifications = CodepagePatch {
        description: args.description.clone(),
        version: args.version.clone(),
        target_table_id: args.target_table.clone(),
        active: args.inactive.then_some(false),
        ..CodepagePatch::default()
    };
    let id = services
        .codepages
        .clone_codepage(
            services.codepage_collection(),
            args.id,
            &args.name,
            &modifications,
        )
        .await?;
    output::print_success(&format!("Cloned codepage {} as {id}", args.id));
    Ok(())
}

/// Execute activate / deactivate
pub async fn set_active(args: &IdArg, services: &Services, active: bool) -> AppResult<()> {
    services
        .codepages
        .set_active(services.codepage_collection(), args.id, active)
        .await?;
    let state = if active { "activated" } else { "deactivated" };
    output::print_success(&format!("Codepage {} {state}", args.id));
    Ok(())
}
