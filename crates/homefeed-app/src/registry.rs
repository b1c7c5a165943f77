//! Account/server registry
//!
//! The registry answers one question for the bootstrap: which server/account
//! pairs are configured, in selection order. Writing new entries is done by
//! sign-in flows (here: the `add-server` CLI command), never by the bootstrap.

use std::path::PathBuf;
use std::sync::RwLock;

use rand::Rng;

use homefeed_core::prelude::*;
use homefeed_core::{Account, ServerConnection};

use crate::config::{load_toml_file, update_toml_file, AccountEntry, ServerEntry, ServersFile};

/// A server together with its signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredAccount {
    pub account: Account,
    pub server: ServerConnection,
}

impl ConfiguredAccount {
    pub fn new(account: Account, server: ServerConnection) -> Self {
        Self { account, server }
    }
}

/// Source of configured server/account pairs.
#[cfg_attr(test, mockall::automock)]
pub trait AccountRegistry: Send + Sync {
    /// Configured pairs in the registry's natural order. Empty is normal.
    fn list_configured(&self) -> Result<Vec<ConfiguredAccount>>;
}

/// Random 32-character hex device identifier for a new sign-in
pub fn generate_device_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryAccountRegistry {
    entries: RwLock<Vec<ConfiguredAccount>>,
}

impl MemoryAccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(entries: Vec<ConfiguredAccount>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn add(&self, entry: ConfiguredAccount) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl AccountRegistry for MemoryAccountRegistry {
    fn list_configured(&self) -> Result<Vec<ConfiguredAccount>> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// servers.toml registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry backed by `servers.toml`.
///
/// Entry order in the file is the selection order. Servers without an
/// `[servers.account]` table are known but not signed in, so they are not
/// listed as configured pairs.
#[derive(Debug, Clone)]
pub struct FileAccountRegistry {
    path: PathBuf,
}

impl FileAccountRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Record a server and its signed-in account.
    ///
    /// An existing entry for the same server id gets its account replaced
    /// (re-authentication). The same account id on the same server may not be
    /// added twice under a different server entry.
    pub fn add(
        &self,
        server: &ServerConnection,
        name: Option<&str>,
        account: &Account,
    ) -> Result<()> {
        update_toml_file::<ServersFile, _>(&self.path, false, |file| {
            let duplicate = file.servers.iter().any(|entry| {
                entry.id != server.server_id
                    && entry.address == server.base_address
                    && entry
                        .account
                        .as_ref()
                        .is_some_and(|a| a.id == account.account_id)
            });
            if duplicate {
                return Err(Error::duplicate_account(&account.account_id));
            }

            match file.servers.iter_mut().find(|e| e.id == server.server_id) {
                Some(entry) => {
                    entry.address = server.base_address.clone();
                    entry.account = Some(AccountEntry::from(account));
                    if let Some(name) = name {
                        entry.name = Some(name.to_string());
                    }
                }
                None => file.servers.push(ServerEntry {
                    id: server.server_id.clone(),
                    address: server.base_address.clone(),
                    name: name.map(str::to_string),
                    account: Some(AccountEntry::from(account)),
                }),
            }
            Ok(())
        })?;

        info!(
            "Registered account {} on server {}",
            account.account_id, server.server_id
        );
        Ok(())
    }

    /// Forget a server entirely. Returns whether it existed.
    pub fn remove(&self, server_id: &str) -> Result<bool> {
        let mut removed = false;
        update_toml_file::<ServersFile, _>(&self.path, false, |file| {
            let before = file.servers.len();
            file.servers.retain(|e| e.id != server_id);
            removed = file.servers.len() != before;
            Ok(())
        })?;
        Ok(removed)
    }

    /// Every entry in the file, signed in or not
    pub fn servers(&self) -> Result<Vec<ServerEntry>> {
        Ok(load_toml_file::<ServersFile>(&self.path)?.servers)
    }
}

impl AccountRegistry for FileAccountRegistry {
    fn list_configured(&self) -> Result<Vec<ConfiguredAccount>> {
        let file: ServersFile = load_toml_file(&self.path)?;

        Ok(file
            .servers
            .iter()
            .filter_map(|entry| match &entry.account {
                Some(account) => Some(ConfiguredAccount::new(account.into(), entry.connection())),
                None => {
                    debug!("Server {} has no signed-in account, skipping", entry.id);
                    None
                }
            })
            .collect())
    }
}
