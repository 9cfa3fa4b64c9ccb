//! # codepage-validate
//!
//! Static, offline validation of codepage source text. Produces a
//! [`ValidationReport`](codepage_entity::ValidationReport) with syntax,
//! security and API-usage findings. No I/O.

pub mod engine;
pub mod extract;
pub mod syntax;

pub use engine::Validator;
