//! Collection ids and field-id overrides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::id::CollectionId;

/// The two remote collections Codepage Hub works against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// The "Codepages" collection.
    #[serde(default)]
    pub codepages: CollectionId,
    /// The "Codepage Versions" collection.
    #[serde(default)]
    pub versions: CollectionId,
    /// Semantic field name to numeric field id, for the codepages collection.
    ///
    /// Entries here win over label-based resolution.
    #[serde(default)]
    pub codepage_fields: HashMap<String, u32>,
    /// Semantic field name to numeric field id, for the versions collection.
    #[serde(default)]
    pub version_fields: HashMap<String, u32>,
}
