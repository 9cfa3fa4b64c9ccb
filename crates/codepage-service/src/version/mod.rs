//! Version control over codepages: immutable snapshots and rollback.

pub mod record;
pub mod service;

pub use service::VersionService;
