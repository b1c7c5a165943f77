//! Configuration file parsing for Homefeed
//!
//! Supports:
//! - `config.toml` - Client identity and HTTP settings
//! - `servers.toml` - Configured servers and signed-in accounts
//! - `credentials.toml` - Stored access tokens

pub mod settings;
pub mod types;

pub use settings::{
    init_config_dir, load_settings, load_toml_file, save_settings, update_toml_file, ConfigPaths,
    CONFIG_DIR_ENV,
};
pub use types::*;
