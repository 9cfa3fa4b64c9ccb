//! Codepage version entities.

pub mod model;

pub use model::{CodepageVersion, NewVersion};
