//! Codepage entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use codepage_core::types::filter::{TAG_DELIMITER, split_list};
use codepage_core::types::id::CodepageId;

use super::draft::CodepageDraft;

/// A stored, named, versioned blob of executable source text plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Codepage {
    /// Store-assigned identity.
    pub id: CodepageId,
    /// Display name. Not unique.
    pub name: String,
    /// Source text, typically HTML with embedded script.
    pub code: String,
    /// Optional description.
    pub description: Option<String>,
    /// Free-form version string, conventionally semver-like.
    pub version: Option<String>,
    /// Tag set. Order and duplicates carry no meaning.
    pub tags: Vec<String>,
    /// Ordered dependency URIs.
    pub dependencies: Vec<String>,
    /// Weak reference to another collection, never checked for existence.
    pub target_table_id: Option<String>,
    /// Whether the codepage shows up in default list/search results.
    pub active: bool,
    /// Store-assigned creation timestamp.
    pub created_date: Option<DateTime<Utc>>,
    /// Store-assigned modification timestamp.
    pub modified_date: Option<DateTime<Utc>>,
}

impl Codepage {
    /// Copy every attribute except identity and timestamps.
    pub fn to_draft(&self) -> CodepageDraft {
        CodepageDraft {
            name: self.name.clone(),
            code: self.code.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            tags: self.tags.clone(),
            dependencies: self.dependencies.clone(),
            target_table_id: self.target_table_id.clone(),
            active: self.active,
        }
    }
}

/// Encode a tag set as the stored delimited text, dropping blanks and duplicates.
pub fn join_tags(tags: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen.join(&TAG_DELIMITER.to_string())
}

/// Decode the stored tag text.
pub fn split_tags(text: &str) -> Vec<String> {
    split_list(text)
}

/// Encode dependencies as newline-delimited text, keeping order.
pub fn join_dependencies(deps: &[String]) -> String {
    deps.iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode newline-delimited dependency text.
pub fn split_dependencies(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
