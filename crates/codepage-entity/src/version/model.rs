//! Codepage version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use codepage_core::types::id::{CodepageId, VersionId};

/// An immutable full copy of a codepage's code at a point in time.
///
/// Versions are only ever created or read, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodepageVersion {
    /// Store-assigned identity.
    pub id: VersionId,
    /// The codepage this snapshot belongs to.
    pub codepage_id: CodepageId,
    /// Free-text label. Collisions are allowed.
    pub version_label: String,
    /// The code at snapshot time.
    pub code_snapshot: String,
    /// Free-text description of the change.
    pub change_log: String,
    /// Store-assigned creation timestamp.
    pub created_date: Option<DateTime<Utc>>,
}

/// Data required to create a new version record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVersion {
    /// Parent codepage.
    pub codepage_id: CodepageId,
    /// Label.
    pub version_label: String,
    /// Code to snapshot.
    pub code_snapshot: String,
    /// Change description.
    pub change_log: String,
}
