//! Homefeed Library
//!
//! Command implementations behind the `homefeed` binary.

pub mod commands;
pub mod headless;

// Re-export main entry points
pub use commands::{add_server, render_config, AddServerRequest};
pub use headless::runner::{exit_code, run_bootstrap};
