//! Settings parser for config.toml and shared TOML file helpers

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::Settings;
use homefeed_core::prelude::*;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "HOMEFEED_CONFIG_DIR";

const APP_DIR: &str = "homefeed";
const CONFIG_FILENAME: &str = "config.toml";
const SERVERS_FILENAME: &str = "servers.toml";
const CREDENTIALS_FILENAME: &str = "credentials.toml";

/// Locations of every Homefeed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the configuration directory.
    ///
    /// Priority: explicit override, then `HOMEFEED_CONFIG_DIR`, then the
    /// platform config directory (`~/.config/homefeed` on Linux).
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(dir) = explicit {
            return Self::new(dir);
        }

        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Self::new(PathBuf::from(dir));
        }

        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(APP_DIR))
    }

    pub fn settings_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILENAME)
    }

    pub fn servers_file(&self) -> PathBuf {
        self.dir.join(SERVERS_FILENAME)
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILENAME)
    }
}

/// Load settings from config.toml.
///
/// A missing or unreadable file yields defaults.
pub fn load_settings(paths: &ConfigPaths) -> Settings {
    let config_path = paths.settings_file();

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Save settings to config.toml (atomic: temp file, then rename)
pub fn save_settings(paths: &ConfigPaths, settings: &Settings) -> Result<()> {
    ensure_dir(&paths.dir)?;

    let config_path = paths.settings_file();
    let temp_path = paths.dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    let full_content = format!("{}{}", generate_config_header(), content);

    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}

/// Write a default config.toml if none exists. Returns whether it was created.
pub fn init_config_dir(paths: &ConfigPaths) -> Result<bool> {
    if paths.settings_file().exists() {
        return Ok(false);
    }
    save_settings(paths, &Settings::default())?;
    Ok(true)
}

fn generate_config_header() -> String {
    r#"# Homefeed Configuration
#
# [client]  name/version/device_name sent in the authorization header
# [http]    timeout_ms and user_agent for server requests

"#
    .to_string()
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::config(format!("Failed to create {:?}: {}", dir, e)))?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Locked TOML files (servers.toml, credentials.toml)
// ─────────────────────────────────────────────────────────────────────────────

/// Read a TOML document, treating a missing or empty file as `T::default()`.
pub fn load_toml_file<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(Error::storage(format!("Failed to read {:?}: {}", path, e))),
    };

    parse_toml(path, &content)
}

/// Read-modify-write a TOML document under an exclusive file lock.
///
/// The lock covers the read, so concurrent writers cannot lose updates.
pub fn update_toml_file<T, F>(path: &Path, private: bool, update: F) -> Result<()>
where
    T: DeserializeOwned + Serialize + Default,
    F: FnOnce(&mut T) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut file = open_for_update(path, private)
        .map_err(|e| Error::storage(format!("Failed to open {:?}: {}", path, e)))?;

    file.lock_exclusive()
        .map_err(|e| Error::storage(format!("Failed to lock {:?}: {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::storage(format!("Failed to read {:?}: {}", path, e)))?;

    let mut document: T = parse_toml(path, &content)?;
    update(&mut document)?;

    let serialized = toml::to_string_pretty(&document)
        .map_err(|e| Error::storage(format!("Failed to serialize {:?}: {}", path, e)))?;

    file.set_len(0)
        .and_then(|_| file.seek(SeekFrom::Start(0)))
        .and_then(|_| file.write_all(serialized.as_bytes()))
        .and_then(|_| file.flush())
        .map_err(|e| Error::storage(format!("Failed to write {:?}: {}", path, e)))?;

    // Lock is released when the file is dropped
    debug!("Updated {:?}", path);
    Ok(())
}

fn parse_toml<T>(path: &Path, content: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    toml::from_str(content)
        .map_err(|e| Error::config(format!("Failed to parse {:?}: {}", path, e)))
}

fn open_for_update(path: &Path, private: bool) -> std::io::Result<std::fs::File> {
    let mut options = std::fs::OpenOptions::new();
    options.read(true).write(true).create(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ServersFile;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings(&ConfigPaths::new(temp.path()));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        let config = r#"
[client]
name = "Living Room"
device_name = "Shield"

[http]
timeout_ms = 2500
"#;
        std::fs::write(temp.path().join("config.toml"), config).unwrap();

        let settings = load_settings(&ConfigPaths::new(temp.path()));

        assert_eq!(settings.client.name, "Living Room");
        assert_eq!(settings.client.device_name, "Shield");
        assert_eq!(settings.http.timeout_ms, 2500);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("config.toml"), "this is [not valid").unwrap();

        let settings = load_settings(&ConfigPaths::new(temp.path()));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load_settings() {
        let temp = tempdir().unwrap();
        let paths = ConfigPaths::new(temp.path().join("nested"));

        let mut settings = Settings::default();
        settings.http.timeout_ms = 999;
        save_settings(&paths, &settings).unwrap();

        let written = std::fs::read_to_string(paths.settings_file()).unwrap();
        assert!(written.starts_with("# Homefeed Configuration"));
        assert!(!paths.dir.join(".config.toml.tmp").exists());
        assert_eq!(load_settings(&paths).http.timeout_ms, 999);
    }

    #[test]
    fn test_init_config_dir_only_once() {
        let temp = tempdir().unwrap();
        let paths = ConfigPaths::new(temp.path());

        assert!(init_config_dir(&paths).unwrap());
        assert!(!init_config_dir(&paths).unwrap());
    }

    #[test]
    #[serial]
    fn test_resolve_explicit_wins_over_env() {
        std::env::set_var(CONFIG_DIR_ENV, "/from/env");
        let paths = ConfigPaths::resolve(Some(Path::new("/explicit")));
        std::env::remove_var(CONFIG_DIR_ENV);

        assert_eq!(paths.dir, PathBuf::from("/explicit"));
    }

    #[test]
    #[serial]
    fn test_resolve_env_override() {
        std::env::set_var(CONFIG_DIR_ENV, "/from/env");
        let paths = ConfigPaths::resolve(None);
        std::env::remove_var(CONFIG_DIR_ENV);

        assert_eq!(paths.dir, PathBuf::from("/from/env"));
        assert_eq!(paths.servers_file(), PathBuf::from("/from/env/servers.toml"));
    }

    #[test]
    #[serial]
    fn test_resolve_default_ends_with_app_dir() {
        std::env::remove_var(CONFIG_DIR_ENV);
        let paths = ConfigPaths::resolve(None);
        assert!(paths.dir.ends_with("homefeed"));
    }

    #[test]
    fn test_load_toml_file_missing_is_default() {
        let temp = tempdir().unwrap();
        let file: ServersFile = load_toml_file(&temp.path().join("servers.toml")).unwrap();
        assert!(file.servers.is_empty());
    }

    #[test]
    fn test_load_toml_file_invalid_is_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("servers.toml");
        std::fs::write(&path, "[[servers]\n").unwrap();
        assert!(load_toml_file::<ServersFile>(&path).is_err());
    }

    #[test]
    fn test_update_toml_file_rewrites_whole_document() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("servers.toml");

        update_toml_file::<ServersFile, _>(&path, false, |file| {
            file.servers.push(crate::config::types::ServerEntry {
                id: "a-very-long-server-identifier".into(),
                address: "http://a".into(),
                name: None,
                account: None,
            });
            Ok(())
        })
        .unwrap();

        update_toml_file::<ServersFile, _>(&path, false, |file| {
            file.servers[0].id = "s".into();
            Ok(())
        })
        .unwrap();

        let file: ServersFile = load_toml_file(&path).unwrap();
        assert_eq!(file.servers.len(), 1);
        assert_eq!(file.servers[0].id, "s");
    }

    #[test]
    fn test_update_toml_file_error_leaves_file_untouched() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("servers.toml");
        std::fs::write(&path, "[[servers]]\nid = \"x\"\naddress = \"http://x\"\n").unwrap();

        let result = update_toml_file::<ServersFile, _>(&path, false, |_| {
            Err(Error::storage("nope"))
        });
        assert!(result.is_err());

        let file: ServersFile = load_toml_file(&path).unwrap();
        assert_eq!(file.servers[0].id, "x");
    }

    #[cfg(unix)]
    #[test]
    fn test_private_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let path = temp.path().join("credentials.toml");
        update_toml_file::<crate::config::types::CredentialsFile, _>(&path, true, |_| Ok(()))
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }
}
