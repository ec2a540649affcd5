//! Persisted config entries for ucremote.
//!
//! One TOML file holds every paired remote (`[entries.<id>]`) plus global
//! defaults. API keys live in the system keyring unless the user opted
//! into plaintext; resolution checks the keyring first.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ucremote_core::{ConfigEntry, ConnectionProfile, MODEL, NewEntry};

/// Keyring service name; the user is `{entry_id}/api-key`.
pub const KEYRING_SERVICE: &str = "ucremote";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "UCREMOTE_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no entry named '{entry_id}'")]
    UnknownEntry { entry_id: String },

    #[error("no entries configured")]
    NoEntries,

    #[error("several entries configured and none is the default")]
    NoDefaultEntry,

    #[error("no API key stored for entry '{entry_id}'")]
    NoCredentials { entry_id: String },

    #[error("keyring: {reason}")]
    Keyring { reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Entry used when none is named on the command line.
    pub default_entry: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Paired remotes by entry id.
    #[serde(default)]
    pub entries: BTreeMap<String, StoredEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_device_type() -> String {
    MODEL.into()
}

/// One paired remote, as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoredEntry {
    pub title: String,
    pub unique_id: String,
    pub url: String,
    pub api_key_name: String,

    #[serde(default = "default_device_type")]
    pub device_type: String,

    /// API key (plaintext; only when the keyring was declined).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl StoredEntry {
    /// Record a finished pairing. The key is kept in the file only when
    /// `plaintext_key` is set.
    pub fn from_new_entry(entry: &NewEntry, plaintext_key: bool) -> Self {
        Self {
            title: entry.title.clone(),
            unique_id: entry.unique_id.clone(),
            url: entry.profile.url.to_string(),
            api_key_name: entry.profile.api_key_name.clone(),
            device_type: entry.profile.device_type.clone(),
            api_key: plaintext_key.then(|| entry.profile.api_key.expose_secret().to_owned()),
        }
    }

    /// Build the core record with an already resolved key.
    pub fn to_config_entry(
        &self,
        entry_id: &str,
        api_key: SecretString,
    ) -> Result<ConfigEntry, ConfigError> {
        let url = url::Url::parse(&self.url).map_err(|e| ConfigError::Validation {
            field: format!("entries.{entry_id}.url"),
            reason: format!("{e}: {}", self.url),
        })?;

        Ok(ConfigEntry {
            entry_id: entry_id.to_owned(),
            title: self.title.clone(),
            unique_id: self.unique_id.clone(),
            profile: ConnectionProfile {
                url,
                api_key,
                api_key_name: self.api_key_name.clone(),
                device_type: self.device_type.clone(),
            },
        })
    }
}

impl Config {
    pub fn entry(&self, entry_id: &str) -> Result<&StoredEntry, ConfigError> {
        self.entries
            .get(entry_id)
            .ok_or_else(|| ConfigError::UnknownEntry {
                entry_id: entry_id.into(),
            })
    }

    pub fn entry_mut(&mut self, entry_id: &str) -> Result<&mut StoredEntry, ConfigError> {
        self.entries
            .get_mut(entry_id)
            .ok_or_else(|| ConfigError::UnknownEntry {
                entry_id: entry_id.into(),
            })
    }

    /// Whether a stored entry already has this unique id.
    pub fn is_configured(&self, unique_id: &str) -> bool {
        self.entries.values().any(|e| e.unique_id == unique_id)
    }

    /// Pick the entry to act on: the explicit one, else the default, else
    /// the only entry.
    pub fn resolve_entry_id(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        if let Some(id) = explicit.or(self.default_entry.as_deref()) {
            self.entry(id)?;
            return Ok(id.to_owned());
        }

        let mut ids = self.entries.keys();
        match (ids.next(), ids.next()) {
            (Some(only), None) => Ok(only.clone()),
            (None, _) => Err(ConfigError::NoEntries),
            (Some(_), Some(_)) => Err(ConfigError::NoDefaultEntry),
        }
    }

    /// Derive a free entry id from a title: `living-room`, `living-room-2`, ...
    pub fn allocate_entry_id(&self, title: &str) -> String {
        let mut base = String::new();
        for c in title.trim().chars() {
            if c.is_ascii_alphanumeric() {
                base.push(c.to_ascii_lowercase());
            } else if !base.ends_with('-') && !base.is_empty() {
                base.push('-');
            }
        }
        let base = base.trim_end_matches('-');
        let base = if base.is_empty() { "remote" } else { base };

        if !self.entries.contains_key(base) {
            return base.to_owned();
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|id| !self.entries.contains_key(id))
            .unwrap_or_else(|| base.to_owned())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `UCREMOTE_CONFIG` if set, else XDG /
/// platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "ucremote", "ucremote").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ucremote");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path and `UCREMOTE_*` variables.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` (missing file = defaults) and the
/// environment. Nested keys use `__`: `UCREMOTE_DEFAULTS__TIMEOUT=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UCREMOTE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── API key storage ─────────────────────────────────────────────────

fn keyring_entry(entry_id: &str) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{entry_id}/api-key")).map_err(|e| {
        ConfigError::Keyring {
            reason: format!("failed to access keyring: {e}"),
        }
    })
}

pub fn store_api_key(entry_id: &str, api_key: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(entry_id)?
        .set_password(api_key.expose_secret())
        .map_err(|e| ConfigError::Keyring {
            reason: format!("failed to store API key: {e}"),
        })
}

/// Remove the entry's key from the keyring. A key that was never there is
/// not an error.
pub fn delete_api_key(entry_id: &str) -> Result<(), ConfigError> {
    match keyring_entry(entry_id)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(ConfigError::Keyring {
            reason: format!("failed to delete API key: {e}"),
        }),
    }
}

/// Resolve an entry's API key: system keyring, then plaintext in config.
pub fn resolve_api_key(stored: &StoredEntry, entry_id: &str) -> Result<SecretString, ConfigError> {
    if let Ok(entry) = keyring_entry(entry_id) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref key) = stored.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        entry_id: entry_id.into(),
    })
}

/// Load one stored entry as a core record, resolving its key.
pub fn load_entry(cfg: &Config, entry_id: &str) -> Result<ConfigEntry, ConfigError> {
    let stored = cfg.entry(entry_id)?;
    let api_key = resolve_api_key(stored, entry_id)?;
    stored.to_config_entry(entry_id, api_key)
}
