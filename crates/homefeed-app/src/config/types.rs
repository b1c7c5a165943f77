//! Configuration types for Homefeed
//!
//! Defines:
//! - `Settings` - Global application settings (`config.toml`)
//! - `ServersFile` - Configured servers and their signed-in accounts (`servers.toml`)
//! - `CredentialsFile` - Stored tokens (`credentials.toml`)

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use homefeed_client::ClientOptions;
use homefeed_core::{Account, ClientIdentity, ServerConnection};

/// Fallback device name when the host name cannot be determined
pub const DEFAULT_DEVICE_NAME: &str = "Homefeed CLI";

/// Global application settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientSettings,

    #[serde(default)]
    pub http: HttpSettings,
}

impl Settings {
    /// Identity advertised in the authorization header
    pub fn client_identity(&self) -> ClientIdentity {
        ClientIdentity::new(
            self.client.name.clone(),
            self.client.version.clone(),
            self.client.device_name.clone(),
        )
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_millis(self.http.timeout_ms.max(1)),
            user_agent: self.http.user_agent.clone(),
        }
    }
}

/// `[client]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientSettings {
    /// Client name sent to the server
    #[serde(default = "default_client_name")]
    pub name: String,

    #[serde(default = "default_client_version")]
    pub version: String,

    /// Human-readable name of this device
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            version: default_client_version(),
            device_name: default_device_name(),
        }
    }
}

fn default_client_name() -> String {
    "Homefeed".to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Host name from the environment, or [`DEFAULT_DEVICE_NAME`]
pub fn default_device_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string())
}

/// `[http]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HttpSettings {
    /// Per-request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_user_agent() -> String {
    format!("homefeed/{}", env!("CARGO_PKG_VERSION"))
}

// ─────────────────────────────────────────────────────────────────────────────
// servers.toml
// ─────────────────────────────────────────────────────────────────────────────

/// Contents of `servers.toml`. Entry order is the registry's selection order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ServersFile {
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

/// One `[[servers]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerEntry {
    pub id: String,
    pub address: String,

    /// Display name of the server, informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The signed-in account for this server, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountEntry>,
}

impl ServerEntry {
    pub fn connection(&self) -> ServerConnection {
        ServerConnection::new(self.id.clone(), self.address.clone())
    }
}

/// `[servers.account]` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AccountEntry {
    pub id: String,
    pub display_name: String,
    pub device_id: String,
}

impl From<&AccountEntry> for Account {
    fn from(entry: &AccountEntry) -> Self {
        Account::new(
            entry.id.clone(),
            entry.display_name.clone(),
            entry.device_id.clone(),
        )
    }
}

impl From<&Account> for AccountEntry {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.clone(),
            display_name: account.display_name.clone(),
            device_id: account.device_id.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// credentials.toml
// ─────────────────────────────────────────────────────────────────────────────

/// Contents of `credentials.toml`: `credential_key(account_id)` -> token
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CredentialsFile {
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}
