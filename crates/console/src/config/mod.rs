//! Console configuration module
//!
//! Handles environment variables, backend paths and console-wide constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::ConsoleConfig;
