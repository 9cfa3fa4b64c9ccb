//! # codepage-core
//!
//! Core crate for Codepage Hub. Contains the unified error system,
//! configuration schemas, typed identifiers, the semantic field model,
//! filter expressions, and the traits other crates implement (record
//! store, HTTP transport, clock, sleeper).
//!
//! This crate has **no** internal dependencies on other Codepage Hub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
