//! The CLI as the integration's host.
//!
//! A one-shot process has no long-lived platforms: forwarding records which
//! platforms an entry asked for, device-name updates are remembered so the
//! caller can report them, and the "already configured" check reads the
//! config file.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;
use ucremote_config::Config;
use ucremote_core::{ConfigEntry, CoreError, DeviceIdentifier, Host, Platform};

#[derive(Debug, Default)]
pub struct CliHost {
    unique_ids: HashSet<String>,
    forwarded: Mutex<BTreeMap<String, Vec<Platform>>>,
    device_names: Mutex<BTreeMap<String, String>>,
}

impl CliHost {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            unique_ids: cfg.entries.values().map(|e| e.unique_id.clone()).collect(),
            ..Self::default()
        }
    }

    /// Platforms forwarded for `entry_id`, empty if none.
    pub fn platforms(&self, entry_id: &str) -> Vec<Platform> {
        self.forwarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entry_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Name last given to the device with `identifier`.
    pub fn device_name(&self, identifier: &DeviceIdentifier) -> Option<String> {
        self.device_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&identifier.to_string())
            .cloned()
    }
}

#[async_trait]
impl Host for CliHost {
    fn is_configured(&self, unique_id: &str) -> bool {
        self.unique_ids.contains(unique_id)
    }

    async fn forward_entry_setups(
        &self,
        entry: &ConfigEntry,
        platforms: &[Platform],
    ) -> Result<(), CoreError> {
        debug!(entry_id = %entry.entry_id, ?platforms, "platforms forwarded");
        self.forwarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.entry_id.clone(), platforms.to_vec());
        Ok(())
    }

    async fn unload_platforms(&self, entry: &ConfigEntry, _platforms: &[Platform]) -> bool {
        self.forwarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&entry.entry_id);
        true
    }

    async fn update_device_name(
        &self,
        identifier: &DeviceIdentifier,
        name: &str,
    ) -> Result<(), CoreError> {
        debug!(device = %identifier, name, "device renamed");
        self.device_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.to_string(), name.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use ucremote_config::StoredEntry;
    use ucremote_core::{ConnectionProfile, MODEL};

    use super::*;

    const URL: &str = "http://192.168.1.20/api/";

    fn config_entry() -> ConfigEntry {
        ConfigEntry {
            entry_id: "den".into(),
            title: "Den".into(),
            unique_id: URL.into(),
            profile: ConnectionProfile {
                url: URL.parse().expect("url"),
                api_key: SecretString::from("key".to_string()),
                api_key_name: "ucremote-0011aabb".into(),
                device_type: MODEL.into(),
            },
        }
    }

    #[test]
    fn configured_ids_come_from_the_config_file() {
        let mut cfg = Config::default();
        cfg.entries.insert(
            "den".into(),
            StoredEntry {
                title: "Den".into(),
                unique_id: URL.into(),
                url: URL.into(),
                api_key_name: "ucremote-0011aabb".into(),
                device_type: MODEL.into(),
                api_key: None,
            },
        );

        let host = CliHost::from_config(&cfg);
        assert!(host.is_configured(URL));
        assert!(!host.is_configured("http://192.168.1.21/api/"));
    }

    #[tokio::test]
    async fn forward_and_unload_track_platforms() {
        let host = CliHost::default();
        let entry = config_entry();

        host.forward_entry_setups(&entry, &[Platform::Remote])
            .await
            .expect("forward");
        assert_eq!(host.platforms("den"), vec![Platform::Remote]);

        assert!(host.unload_platforms(&entry, &[Platform::Remote]).await);
        assert!(host.platforms("den").is_empty());
    }

    #[tokio::test]
    async fn renames_are_remembered() {
        let host = CliHost::default();
        let identifier = DeviceIdentifier::new(URL);

        host.update_device_name(&identifier, "Office")
            .await
            .expect("rename");
        assert_eq!(host.device_name(&identifier).as_deref(), Some("Office"));
    }
}
