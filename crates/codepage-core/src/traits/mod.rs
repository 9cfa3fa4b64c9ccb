//! Core traits defined in `codepage-core` and implemented by other crates.

pub mod clock;
pub mod store;
pub mod transport;

pub use clock::{Clock, ManualClock, Sleeper, SystemClock, TokioSleeper};
pub use store::RecordStore;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
