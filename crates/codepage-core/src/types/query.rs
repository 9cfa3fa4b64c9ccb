//! Record query descriptors.

use serde::{Deserialize, Serialize};

use crate::types::field::FieldName;
use crate::types::filter::Filter;

/// Sort key for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    /// Field to sort on.
    pub field: FieldName,
    /// Descending when `true`.
    pub descending: bool,
}

impl SortBy {
    /// Descending sort on a field.
    pub fn desc(field: FieldName) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Ascending sort on a field.
    pub fn asc(field: FieldName) -> Self {
        Self {
            field,
            descending: false,
        }
    }
}

/// A query against one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordQuery {
    /// Optional filter; `None` selects every record.
    pub filter: Option<Filter>,
    /// Fields to return. Unmapped fields are skipped.
    pub select: Vec<FieldName>,
    /// Sort keys, applied in order.
    pub sort: Vec<SortBy>,
    /// Maximum number of rows.
    pub limit: Option<u32>,
}

impl RecordQuery {
    /// Query selecting the given fields.
    pub fn select(fields: &[FieldName]) -> Self {
        Self {
            select: fields.to_vec(),
            ..Self::default()
        }
    }

    /// Attach a filter.
    pub fn filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    /// Append a sort key.
    pub fn sort(mut self, sort: SortBy) -> Self {
        self.sort.push(sort);
        self
    }

    /// Bound the number of rows.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}
