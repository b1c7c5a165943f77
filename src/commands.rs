//! Configuration commands: `add-server` and `show-config`

use homefeed_app::config::{init_config_dir, load_settings, ConfigPaths};
use homefeed_app::{
    generate_device_id, ConfiguredAccount, CredentialStore, FileAccountRegistry,
    FileCredentialStore,
};
use homefeed_client::parse_base_address;
use homefeed_core::prelude::*;
use homefeed_core::{logging, Account, Credential, ServerConnection};

/// Arguments of `add-server`
#[derive(Debug, Clone, Default)]
pub struct AddServerRequest {
    pub address: String,
    pub account_id: String,
    pub display_name: String,
    pub server_id: Option<String>,
    pub server_name: Option<String>,
    pub token: Option<String>,
}

/// Record a server/account pair and optionally its token.
///
/// An entry with the same server id (or, without an explicit id, the same
/// address) is updated in place. Re-adding the same account keeps its device
/// id so the server sees the same device.
pub fn add_server(paths: &ConfigPaths, request: &AddServerRequest) -> Result<ConfiguredAccount> {
    let account_id = request.account_id.trim();
    if account_id.is_empty() {
        return Err(Error::config("account id must not be empty"));
    }

    let url = parse_base_address(&request.address)?;
    let address = url.as_str().trim_end_matches('/').to_string();

    if init_config_dir(paths)? {
        info!("Created default config in {}", paths.dir.display());
    }

    let registry = FileAccountRegistry::new(paths.servers_file());
    let existing = registry.servers()?.into_iter().find(|entry| match &request.server_id {
        Some(id) => &entry.id == id,
        None => entry.address == address,
    });

    let server_id = request
        .server_id
        .clone()
        .or_else(|| existing.as_ref().map(|entry| entry.id.clone()))
        .unwrap_or_else(generate_device_id);

    let device_id = existing
        .as_ref()
        .and_then(|entry| entry.account.as_ref())
        .filter(|account| account.id == account_id)
        .map(|account| account.device_id.clone())
        .unwrap_or_else(generate_device_id);

    let server = ServerConnection::new(server_id, address);
    let account = Account::new(account_id, request.display_name.trim(), device_id);
    registry.add(&server, request.server_name.as_deref(), &account)?;

    if let Some(token) = &request.token {
        FileCredentialStore::new(paths.credentials_file())
            .store(&account.account_id, &Credential::new(token.trim()))?;
    }

    Ok(ConfiguredAccount::new(account, server))
}

/// Human-readable dump of the resolved configuration. Tokens are never shown.
pub fn render_config(paths: &ConfigPaths) -> Result<String> {
    let settings = load_settings(paths);
    let settings_toml = toml::to_string_pretty(&settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;

    let mut lines = vec![
        format!("# config dir:  {}", paths.dir.display()),
        format!("# settings:    {}", paths.settings_file().display()),
        format!("# servers:     {}", paths.servers_file().display()),
        format!("# credentials: {}", paths.credentials_file().display()),
        format!("# log file:    {}", logging::current_log_file().display()),
        String::new(),
        settings_toml.trim_end().to_string(),
        String::new(),
    ];

    let registry = FileAccountRegistry::new(paths.servers_file());
    let credentials = FileCredentialStore::new(paths.credentials_file());
    let servers = registry.servers().context("Failed to list servers")?;

    if servers.is_empty() {
        lines.push("# no servers configured".to_string());
    }

    for entry in servers {
        let label = entry.name.as_deref().unwrap_or("-");
        lines.push(format!("[server {}] {} ({})", entry.id, entry.address, label));
        match entry.account {
            Some(account) => {
                let token = match credentials.lookup(&account.id) {
                    Some(credential) if !credential.is_empty() => "stored",
                    _ => "missing",
                };
                lines.push(format!(
                    "  account {} ({}) device {} token {}",
                    account.id, account.display_name, account.device_id, token
                ));
            }
            None => lines.push("  not signed in".to_string()),
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use homefeed_app::AccountRegistry;
    use tempfile::TempDir;

    fn request(address: &str, account_id: &str) -> AddServerRequest {
        AddServerRequest {
            address: address.to_string(),
            account_id: account_id.to_string(),
            display_name: "Alice".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_server_registers_pair_and_token() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::new(temp.path());

        let added = add_server(
            &paths,
            &AddServerRequest {
                server_name: Some("Home".into()),
                token: Some("tok-1".into()),
                ..request("http://media.local:8096/", "u1")
            },
        )
        .unwrap();

        assert_eq!(added.server.base_address, "http://media.local:8096");
        assert_eq!(added.account.device_id.len(), 32);
        assert!(paths.settings_file().exists());

        let listed = FileAccountRegistry::new(paths.servers_file())
            .list_configured()
            .unwrap();
        assert_eq!(listed, vec![added]);

        let token = FileCredentialStore::new(paths.credentials_file())
            .lookup("u1")
            .unwrap();
        assert_eq!(token.token(), "tok-1");
    }

    #[test]
    fn test_add_server_reuses_entry_and_device_id() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::new(temp.path());

        let first = add_server(&paths, &request("https://media.example.com", "u1")).unwrap();
        let second = add_server(&paths, &request("https://media.example.com/", "u1")).unwrap();

        assert_eq!(first.server.server_id, second.server.server_id);
        assert_eq!(first.account.device_id, second.account.device_id);

        let servers = FileAccountRegistry::new(paths.servers_file())
            .servers()
            .unwrap();
        assert_eq!(servers.len(), 1);
    }

    #[test]
    fn test_add_server_rejects_bad_input() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::new(temp.path());

        let err = add_server(&paths, &request("ftp://media", "u1")).unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));

        let err = add_server(&paths, &request("http://media", "  ")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        assert!(!paths.servers_file().exists());
    }

    #[test]
    fn test_render_config_hides_tokens() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::new(temp.path());
        add_server(
            &paths,
            &AddServerRequest {
                token: Some("super-secret".into()),
                ..request("http://media.local", "u1")
            },
        )
        .unwrap();

        let rendered = render_config(&paths).unwrap();

        assert!(rendered.contains("[client]"));
        assert!(rendered.contains("timeout_ms = 15000"));
        assert!(rendered.contains("http://media.local"));
        assert!(rendered.contains("token stored"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_render_config_empty() {
        let temp = TempDir::new().unwrap();
        let rendered = render_config(&ConfigPaths::new(temp.path())).unwrap();
        assert!(rendered.contains("# no servers configured"));
        assert!(rendered.contains("homefeed.log"));
    }
}
