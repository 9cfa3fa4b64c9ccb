//! Codepage drafts (records not yet created) and partial updates.

use serde::{Deserialize, Serialize};

use codepage_core::error::AppError;
use codepage_core::result::AppResult;

/// A codepage missing identity and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodepageDraft {
    /// Display name.
    pub name: String,
    /// Source text.
    pub code: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Tag set.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ordered dependency URIs.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Weak reference to another collection.
    #[serde(default)]
    pub target_table_id: Option<String>,
    /// Active flag.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl CodepageDraft {
    /// A new active draft with only a name and code.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            description: None,
            version: None,
            tags: Vec::new(),
            dependencies: Vec::new(),
            target_table_id: None,
            active: true,
        }
    }

    /// Set the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tag set.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Check the invariant a record must satisfy before it becomes visible:
    /// non-empty name and code.
    pub fn ensure_deployable(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Codepage name must not be empty"));
        }
        if self.code.trim().is_empty() {
            return Err(AppError::validation("Codepage code must not be empty"));
        }
        Ok(())
    }

    /// Overlay the fields present in `patch`.
    pub fn apply(&mut self, patch: &CodepagePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(code) = &patch.code {
            self.code = code.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(version) = &patch.version {
            self.version = Some(version.clone());
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(deps) = &patch.dependencies {
            self.dependencies = deps.clone();
        }
        if let Some(target) = &patch.target_table_id {
            self.target_table_id = Some(target.clone());
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}

/// A partial update: only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodepagePatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Replacement tag set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Replacement dependency list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    /// New target table reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table_id: Option<String>,
    /// New active flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl CodepagePatch {
    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.description.is_none()
            && self.version.is_none()
            && self.tags.is_none()
            && self.dependencies.is_none()
            && self.target_table_id.is_none()
            && self.active.is_none()
    }

    /// Patch that replaces only the code.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Patch that only flips the active flag.
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }

    /// Reject patches that would blank out name or code.
    pub fn ensure_consistent(&self) -> AppResult<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Codepage name must not be empty"));
        }
        if self.code.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::validation("Codepage code must not be empty"));
        }
        Ok(())
    }
}
