//! Sports services admin console.
//!
//! Library behind the `sports-admin` binary: session handling, backend
//! clients, the request scheduler and the approval, user-management,
//! dashboard, shop and support workflows.

pub mod cli;
pub mod clients;
pub mod commands;
pub mod config;
pub mod scheduler;
pub mod services;
pub mod session;
pub mod state;
pub mod validation;

pub use config::ConsoleConfig;
pub use state::AppState;
