//! # codepage-entity
//!
//! Domain entity models for Codepage Hub: codepages and their drafts and
//! patches, immutable version snapshots, temporary authorization tokens,
//! and validation reports.

pub mod codepage;
pub mod token;
pub mod validation;
pub mod version;

pub use codepage::{Codepage, CodepageDraft, CodepagePatch};
pub use token::TemporaryToken;
pub use validation::{ValidationOptions, ValidationReport};
pub use version::{CodepageVersion, NewVersion};
