//! Credential stores keyed by account id.
//!
//! Tokens are stored under [`credential_key`], one key per account, so
//! accounts on different servers never overwrite each other.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use homefeed_core::prelude::*;
use homefeed_core::{credential_key, Credential};

use crate::config::{load_toml_file, update_toml_file, CredentialsFile};

/// Lookup of stored tokens.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Token stored for `account_id`, if any.
    ///
    /// Storage failures read as "absent"; the profile call then reports the
    /// problem as a sign-in error.
    fn lookup(&self, account_id: &str) -> Option<Credential>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: RwLock<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, account_id: &str, credential: Credential) {
        self.tokens
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(credential_key(account_id), credential);
    }

    pub fn remove(&self, account_id: &str) -> bool {
        self.tokens
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&credential_key(account_id))
            .is_some()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn lookup(&self, account_id: &str) -> Option<Credential> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&credential_key(account_id))
            .cloned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// credentials.toml store
// ─────────────────────────────────────────────────────────────────────────────

/// Store backed by `credentials.toml`, created owner-readable only.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn store(&self, account_id: &str, credential: &Credential) -> Result<()> {
        update_toml_file::<CredentialsFile, _>(&self.path, true, |file| {
            file.tokens
                .insert(credential_key(account_id), credential.token().to_string());
            Ok(())
        })?;
        debug!("Stored credential for account {}", account_id);
        Ok(())
    }

    pub fn remove(&self, account_id: &str) -> Result<bool> {
        let mut removed = false;
        update_toml_file::<CredentialsFile, _>(&self.path, true, |file| {
            removed = file.tokens.remove(&credential_key(account_id)).is_some();
            Ok(())
        })?;
        Ok(removed)
    }
}

impl CredentialStore for FileCredentialStore {
    fn lookup(&self, account_id: &str) -> Option<Credential> {
        match load_toml_file::<CredentialsFile>(&self.path) {
            Ok(file) => file
                .tokens
                .get(&credential_key(account_id))
                .map(|token| Credential::new(token.clone())),
            Err(e) => {
                warn!("Failed to read credentials: {}", e);
                None
            }
        }
    }
}
