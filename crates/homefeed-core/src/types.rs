//! Core domain types for accounts, servers and stored credentials

use serde::{Deserialize, Serialize};

/// A previously authenticated user on a specific server.
///
/// Created by a sign-in flow elsewhere; the bootstrap only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable per-server user identity
    pub account_id: String,
    pub display_name: String,
    /// Device identifier this account signed in with
    pub device_id: String,
}

impl Account {
    pub fn new(
        account_id: impl Into<String>,
        display_name: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            display_name: display_name.into(),
            device_id: device_id.into(),
        }
    }
}

/// A configured media server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConnection {
    /// Opaque identity of the server
    pub server_id: String,
    /// Base URI, e.g. `https://media.example.com/jellyfin`
    pub base_address: String,
}

impl ServerConnection {
    pub fn new(server_id: impl Into<String>, base_address: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            base_address: base_address.into(),
        }
    }
}

/// Opaque bearer token for one account.
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Credential used when nothing is stored for the account
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &if self.is_empty() { "<empty>" } else { "<redacted>" })
            .finish()
    }
}

/// Key under which an account's token is stored.
///
/// One key per account id, so several stored accounts never collide.
pub fn credential_key(account_id: &str) -> String {
    format!("AccessToken_{}", account_id)
}
