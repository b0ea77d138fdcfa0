//! CLI module - Command-line interface for the admin console.
//!
//! Provides commands for:
//! - `login` / `logout` / `whoami` - Admin session
//! - `approvals` - Pending registrations queue
//! - `users` - User management
//! - `dashboard` - Platform summary
//! - `shop` - Shop analytics and store lookups
//! - `tickets` - Support desk

pub mod args;

pub use args::{Cli, Commands};
