//! # codepage-cli
//!
//! Command tree and output formatting for the `codepage` binary. Commands
//! translate arguments into lifecycle, version-control, validation and
//! codec calls; [`Services`] wires those from configuration.

pub mod commands;
pub mod output;
pub mod services;

pub use commands::Cli;
pub use services::Services;
