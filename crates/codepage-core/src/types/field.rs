//! Semantic field names and the adapter that maps them to numeric field ids.
//!
//! The remote store addresses columns by number, and the numbering differs
//! between collections (and between generations of the same collection).
//! Everything above the client works with [`FieldName`] only; a
//! [`FieldMap`] is resolved once per collection from its schema.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Field values keyed by semantic name, as read from or written to one record.
pub type FieldValues = BTreeMap<FieldName, serde_json::Value>;

/// Semantic name of a column in the codepages or versions collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// Store-assigned record number.
    RecordId,
    /// Store-assigned creation timestamp.
    CreatedDate,
    /// Store-assigned modification timestamp.
    ModifiedDate,
    /// Codepage name.
    Name,
    /// Codepage source text.
    Code,
    /// Codepage description.
    Description,
    /// Free-form version string of a codepage.
    Version,
    /// Delimited tag list.
    Tags,
    /// Newline-delimited dependency URIs.
    Dependencies,
    /// Weak reference to another collection.
    TargetTableId,
    /// Active flag.
    Active,
    /// Parent codepage of a version record.
    CodepageRef,
    /// Label of a version record.
    VersionLabel,
    /// Code snapshot of a version record.
    CodeSnapshot,
    /// Change log of a version record.
    ChangeLog,
}

impl FieldName {
    /// Every field the codepages collection may carry.
    pub const CODEPAGE_FIELDS: &'static [FieldName] = &[
        FieldName::RecordId,
        FieldName::CreatedDate,
        FieldName::ModifiedDate,
        FieldName::Name,
        FieldName::Code,
        FieldName::Description,
        FieldName::Version,
        FieldName::Tags,
        FieldName::Dependencies,
        FieldName::TargetTableId,
        FieldName::Active,
    ];

    /// Fields the codepages collection must expose.
    pub const CODEPAGE_REQUIRED: &'static [FieldName] =
        &[FieldName::RecordId, FieldName::Name, FieldName::Code];

    /// Every field the versions collection may carry.
    pub const VERSION_FIELDS: &'static [FieldName] = &[
        FieldName::RecordId,
        FieldName::CreatedDate,
        FieldName::CodepageRef,
        FieldName::VersionLabel,
        FieldName::CodeSnapshot,
        FieldName::ChangeLog,
    ];

    /// Fields the versions collection must expose.
    pub const VERSION_REQUIRED: &'static [FieldName] = &[
        FieldName::RecordId,
        FieldName::CodepageRef,
        FieldName::CodeSnapshot,
    ];

    /// Snake-case key used in configuration overrides.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecordId => "record_id",
            Self::CreatedDate => "created_date",
            Self::ModifiedDate => "modified_date",
            Self::Name => "name",
            Self::Code => "code",
            Self::Description => "description",
            Self::Version => "version",
            Self::Tags => "tags",
            Self::Dependencies => "dependencies",
            Self::TargetTableId => "target_table_id",
            Self::Active => "active",
            Self::CodepageRef => "codepage_id",
            Self::VersionLabel => "version_label",
            Self::CodeSnapshot => "code_snapshot",
            Self::ChangeLog => "change_log",
        }
    }

    /// Column labels recognised for this field, lowercase.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Self::RecordId => &["record id#", "record id"],
            Self::CreatedDate => &["date created", "created date"],
            Self::ModifiedDate => &["date modified", "modified date"],
            Self::Name => &["name", "codepage name"],
            Self::Code => &["code", "source", "codepage code"],
            Self::Description => &["description"],
            Self::Version => &["version"],
            Self::Tags => &["tags"],
            Self::Dependencies => &["dependencies"],
            Self::TargetTableId => &["target table id", "target table", "targettableid"],
            Self::Active => &["active", "is active"],
            Self::CodepageRef => &["codepage id", "related codepage", "codepage"],
            Self::VersionLabel => &["version label", "version"],
            Self::CodeSnapshot => &["code snapshot", "code"],
            Self::ChangeLog => &["change log", "changelog"],
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::CODEPAGE_FIELDS
            .iter()
            .chain(Self::VERSION_FIELDS)
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| AppError::configuration(format!("Unknown field name '{s}'")))
    }
}

/// One column of a collection schema as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Numeric field id.
    pub id: u32,
    /// Column label.
    pub label: String,
}

/// Bidirectional mapping between semantic names and numeric field ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    by_name: HashMap<FieldName, u32>,
    by_id: HashMap<u32, FieldName>,
}

impl FieldMap {
    /// Build a map directly from explicit pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (FieldName, u32)>) -> Self {
        let mut map = Self::default();
        for (name, id) in pairs {
            map.insert(name, id);
        }
        map
    }

    /// Resolve a map from a collection schema.
    ///
    /// Overrides are applied first; remaining `wanted` fields are matched
    /// against column labels case-insensitively, in label preference order.
    /// Fails if any `required` field stays unresolved.
    pub fn resolve(
        schema: &[FieldSchema],
        wanted: &[FieldName],
        required: &[FieldName],
        overrides: &HashMap<String, u32>,
    ) -> AppResult<Self> {
        let mut map = Self::default();

        for (key, id) in overrides {
            let name: FieldName = key.parse()?;
            map.insert(name, *id);
        }

        for &name in wanted {
            if map.by_name.contains_key(&name) {
                continue;
            }
            let found = name.labels().iter().find_map(|label| {
                schema.iter().find(|col| {
                    col.label.trim().eq_ignore_ascii_case(label) && !map.by_id.contains_key(&col.id)
                })
            });
            if let Some(col) = found {
                map.insert(name, col.id);
            }
        }

        let missing: Vec<&str> = required
            .iter()
            .filter(|f| !map.by_name.contains_key(f))
            .map(|f| f.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::configuration(format!(
                "Collection schema is missing required fields: {}",
                missing.join(", ")
            )));
        }

        Ok(map)
    }

    fn insert(&mut self, name: FieldName, id: u32) {
        if let Some(old) = self.by_name.insert(name, id) {
            self.by_id.remove(&old);
        }
        self.by_id.insert(id, name);
    }

    /// Numeric id of a semantic field.
    pub fn id(&self, name: FieldName) -> AppResult<u32> {
        self.by_name.get(&name).copied().ok_or_else(|| {
            AppError::configuration(format!("Field '{name}' is not mapped in this collection"))
        })
    }

    /// Whether a semantic field is mapped.
    pub fn contains(&self, name: FieldName) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Semantic name of a numeric field id.
    pub fn name_of(&self, id: u32) -> Option<FieldName> {
        self.by_id.get(&id).copied()
    }

    /// Numeric ids of the given fields that are mapped, skipping the rest.
    pub fn ids_of(&self, names: &[FieldName]) -> Vec<u32> {
        names
            .iter()
            .filter_map(|n| self.by_name.get(n).copied())
            .collect()
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
