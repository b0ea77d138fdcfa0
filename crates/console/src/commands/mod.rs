//! Commands module - CLI command implementations.
//!
//! Each command group is implemented in its own module and receives the
//! shared `AppState` plus the requested output format.

pub mod approvals;
pub mod auth;
pub mod dashboard;
pub mod output;
pub mod prompt;
pub mod shop;
pub mod tickets;
pub mod users;

pub use output::OutputFormat;
