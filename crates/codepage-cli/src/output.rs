//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use codepage_entity::codepage::Codepage;
use codepage_entity::validation::ValidationReport;
use codepage_entity::version::CodepageVersion;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Codepage display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct CodepageRow {
    /// Record id
    id: u64,
    /// Name
    name: String,
    /// Version string
    version: String,
    /// Active flag
    active: String,
    /// Tags
    tags: String,
    /// Target table
    target: String,
    /// Last modified
    modified: String,
}

impl From<&Codepage> for CodepageRow {
    fn from(cp: &Codepage) -> Self {
        Self {
            id: cp.id.get(),
            name: cp.name.clone(),
            version: cp.version.clone().unwrap_or_default(),
            active: if cp.active { "yes" } else { "no" }.to_string(),
            tags: cp.tags.join(", "),
            target: cp.target_table_id.clone().unwrap_or_default(),
            modified: cp
                .modified_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Version display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct VersionRow {
    /// Version record id
    id: u64,
    /// Label
    label: String,
    /// Created at
    created: String,
    /// Size of the snapshot in bytes
    bytes: usize,
    /// Change log
    change_log: String,
}

impl From<&CodepageVersion> for VersionRow {
    fn from(v: &CodepageVersion) -> Self {
        Self {
            id: v.id.get(),
            label: v.version_label.clone(),
            created: v
                .created_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            bytes: v.code_snapshot.len(),
            change_log: v.change_log.clone(),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Print one codepage with its metadata
pub fn print_codepage(cp: &Codepage, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("Id", &cp.id.to_string());
            print_kv("Name", &cp.name);
            print_kv("Version", cp.version.as_deref().unwrap_or("-"));
            print_kv("Active", if cp.active { "yes" } else { "no" });
            print_kv("Description", cp.description.as_deref().unwrap_or("-"));
            print_kv("Tags", &cp.tags.join(", "));
            print_kv("Dependencies", &cp.dependencies.join(", "));
            print_kv("Target table", cp.target_table_id.as_deref().unwrap_or("-"));
            print_kv("Code", &format!("{} bytes", cp.code.len()));
        }
        OutputFormat::Json => print_json(cp),
    }
}

/// Print one version with its metadata
pub fn print_version(v: &CodepageVersion, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("Id", &v.id.to_string());
            print_kv("Codepage", &v.codepage_id.to_string());
            print_kv("Label", &v.version_label);
            print_kv("Change log", &v.change_log);
            print_kv("Snapshot", &format!("{} bytes", v.code_snapshot.len()));
        }
        OutputFormat::Json => print_json(v),
    }
}

/// Print a validation report, grouped by severity
pub fn print_report(report: &ValidationReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if report.is_valid {
                print_success("Validation passed");
            } else {
                print_error("Validation failed");
            }
            for issue in &report.security_issues {
                println!("  [security]   {issue}");
            }
            for err in &report.errors {
                println!("  [error]      {err}");
            }
            for warning in &report.warnings {
                println!("  [warning]    {warning}");
            }
            for suggestion in &report.suggestions {
                println!("  [suggestion] {suggestion}");
            }
        }
        OutputFormat::Json => print_json(report),
    }
}

fn print_json<T: Serialize + ?Sized>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {}", format!("{key}:"), value);
}
