//! homefeed-app - Session bootstrap orchestration for Homefeed
//!
//! This crate owns the launch sequence: it picks the configured account,
//! loads its credential, fetches the user's library layout and publishes the
//! resulting [`HomeFeedState`](homefeed_core::HomeFeedState). It also holds
//! the configuration layer and the file-backed registry and credential store.

pub mod config;
pub mod coordinator;
pub mod credentials;
pub mod event;
pub mod registry;

// Re-export primary types
pub use coordinator::{library_name_map, ProfileLibraries, SessionBootstrapCoordinator};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use event::BootstrapEvent;
pub use registry::{
    generate_device_id, AccountRegistry, ConfiguredAccount, FileAccountRegistry,
    MemoryAccountRegistry,
};
