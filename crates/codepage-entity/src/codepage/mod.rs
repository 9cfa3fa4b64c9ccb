//! Codepage domain entities.

pub mod draft;
pub mod model;

pub use draft::{CodepageDraft, CodepagePatch};
pub use model::{Codepage, join_dependencies, join_tags, split_dependencies, split_tags};
