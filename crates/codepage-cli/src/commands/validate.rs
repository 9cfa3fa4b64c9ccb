//! Static validation command.

use std::path::PathBuf;

use clap::Args;

use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_entity::validation::ValidationOptions;
use codepage_validate::Validator;

use crate::output::{self, OutputFormat};

/// Arguments for validate
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Source file to check
    pub file: PathBuf,
    /// Skip the syntax check
    #[arg(long)]
    pub no_syntax: bool,
    /// Skip API usage checks
    #[arg(long)]
    pub no_apis: bool,
    /// Skip security checks
    #[arg(long)]
    pub no_security: bool,
    /// Exit with an error when the report is invalid
    #[arg(long)]
    pub strict: bool,
}

impl ValidateArgs {
    fn options(&self) -> ValidationOptions {
        ValidationOptions {
            check_syntax: !self.no_syntax,
            check_apis: !self.no_apis,
            check_security: !self.no_security,
        }
    }
}

/// Execute validate. Needs no configuration or network access.
pub async fn execute(args: &ValidateArgs, format: OutputFormat) -> AppResult<()> {
    let source = super::read_file(&args.file).await?;
    let report = Validator::new()?.validate(&source, &args.options());
    output::print_report(&report, format);

    if args.strict && !report.is_valid {
        return Err(AppError::validation(format!(
            "{} blocking finding(s) in {}",
            report.blocking_findings().count(),
            args.file.display()
        )));
    }
    Ok(())
}
