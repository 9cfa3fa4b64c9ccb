//! Codepage search by term, tags, target table and active flag.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use codepage_core::result::AppResult;
use codepage_core::types::field::FieldName;
use codepage_core::types::filter::Filter;
use codepage_core::types::id::CollectionId;
use codepage_core::types::query::{RecordQuery, SortBy};
use codepage_entity::codepage::Codepage;

use super::service::CodepageService;

/// Search criteria. Every given criterion must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Substring of the name or the description.
    #[serde(default)]
    pub term: Option<String>,
    /// Tags that must all be present.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Exact target table reference.
    #[serde(default)]
    pub target_table_id: Option<String>,
    /// Only active codepages when `true` (the default).
    #[serde(default = "default_active_only")]
    pub active_only: bool,
    /// Maximum number of results.
    #[serde(default)]
    pub limit: Option<u32>,
}

fn default_active_only() -> bool {
    true
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            term: None,
            tags: Vec::new(),
            target_table_id: None,
            active_only: true,
            limit: None,
        }
    }
}

impl SearchRequest {
    /// Search for a term in name or description.
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Self::default()
        }
    }

    /// Build the conjunctive filter for a collection carrying every field.
    /// `None` means "everything".
    pub fn to_filter(&self) -> Option<Filter> {
        self.to_filter_with(|_| true)
    }

    /// Build the conjunctive filter, given which optional columns exist.
    ///
    /// Without a description column the term only tests the name. Without
    /// an active column every codepage reads as active, so the active
    /// criterion is dropped.
    pub fn to_filter_with(&self, has_field: impl Fn(FieldName) -> bool) -> Option<Filter> {
        let mut parts = Vec::new();

        if let Some(term) = self.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let mut alternatives = vec![Filter::Contains(FieldName::Name, term.to_string())];
            if has_field(FieldName::Description) {
                alternatives.push(Filter::Contains(FieldName::Description, term.to_string()));
            }
            parts.push(match alternatives.len() {
                1 => alternatives.remove(0),
                _ => Filter::Or(alternatives),
            });
        }
        parts.extend(
            self.tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(|t| Filter::Has(FieldName::Tags, t.to_string())),
        );
        if let Some(target) = self.target_table_id.as_deref().filter(|t| !t.trim().is_empty()) {
            parts.push(Filter::Eq(FieldName::TargetTableId, json!(target)));
        }
        if self.active_only && has_field(FieldName::Active) {
            parts.push(Filter::Eq(FieldName::Active, json!(true)));
        }

        Filter::all(parts)
    }
}

impl CodepageService {
    /// Codepages matching every given criterion, most recent first.
    pub async fn search(
        &self,
        collection: &CollectionId,
        request: &SearchRequest,
    ) -> AppResult<Vec<Codepage>> {
        let has_description = self
            .store
            .has_field(collection, FieldName::Description)
            .await
            .map_err(|e| e.context("search"))?;
        let has_active = self
            .store
            .has_field(collection, FieldName::Active)
            .await
            .map_err(|e| e.context("search"))?;
        let filter = request.to_filter_with(|field| match field {
            FieldName::Description => has_description,
            FieldName::Active => has_active,
            _ => true,
        });

        let mut query = RecordQuery::select(FieldName::CODEPAGE_FIELDS)
            .filter(filter)
            .sort(SortBy::desc(FieldName::RecordId));
        if let Some(limit) = request.limit {
            query = query.limit(limit);
        }

        let found = self
            .fetch(collection, &query)
            .await
            .map_err(|e| e.context("search"))?;
        debug!(collection = %collection, results = found.len(), "Search finished");
        Ok(found)
    }
}
