//! # codepage-cache
//!
//! In-process caches used by the request client:
//!
//! - **tokens**: temporary authorization tokens keyed by resource id, with
//!   per-key serialization so concurrent callers share one acquisition
//! - **schema**: resolved field maps per collection, backed by
//!   [moka](https://crates.io/crates/moka)
//!
//! Both caches are owned by the client instance; there is no global state.

pub mod keys;
pub mod schema;
pub mod token;

pub use schema::FieldMapCache;
pub use token::TokenCache;
