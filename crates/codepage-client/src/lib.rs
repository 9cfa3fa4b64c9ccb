//! # codepage-client
//!
//! The resilient request client used for every call to the remote record
//! store. It owns:
//!
//! - temporary-token acquisition and caching per resource id
//! - a single, uncounted token refresh on a first-attempt 401
//! - a bounded exponential-backoff retry ladder for transient failures
//! - the `get`/`post`/`patch`/`delete` verb wrappers
//!
//! On top of it, [`RemoteRecordStore`] implements the record-store verbs
//! with semantic field names resolved through a cached field map.

pub mod auth;
pub mod client;
pub mod retry;
pub mod store;
pub mod transport;
mod wire;

pub use auth::Authenticator;
pub use client::RequestClient;
pub use retry::RetryPolicy;
pub use store::{CollectionSpec, RemoteRecordStore};
pub use transport::ReqwestTransport;
