//! Shared value types: identifiers, semantic fields, filters, and queries.

pub mod field;
pub mod filter;
pub mod id;
pub mod query;

pub use field::{FieldMap, FieldName, FieldSchema, FieldValues};
pub use filter::Filter;
pub use id::{CodepageId, CollectionId, RecordId, VersionId};
pub use query::{RecordQuery, SortBy};
