//! # codepage-service
//!
//! Business logic for Codepage Hub. Services orchestrate record-store
//! calls to implement the codepage lifecycle (deploy, update, get, list,
//! search, clone, activation) and version control (snapshot, history,
//! rollback). The codec converts codepages to and from their wire
//! representations.
//!
//! Services follow constructor injection: every dependency is provided
//! at construction time via `Arc` references.

pub mod codec;
pub mod codepage;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::Format;
pub use codepage::{CodepageService, DeployOutcome, SearchRequest};
pub use version::VersionService;
