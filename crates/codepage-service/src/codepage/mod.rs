//! Codepage lifecycle: deploy, update, fetch, list, search, clone.

pub mod record;
pub mod search;
pub mod service;

pub use search::SearchRequest;
pub use service::{CodepageService, DeployOutcome};
