// ── Device wrapper ──
//
// One authenticated session per stored config entry. Setup fetches the
// remote's identity once, registers the device with the integration and
// forwards the entry to the entity platforms; unload reverses that.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info};
use ucremote_api::{Credentials, RemoteApi, VersionInfo};
use url::Url;

use crate::error::CoreError;
use crate::host::{Host, Teardown};
use crate::integration::Integration;
use crate::model::{ConfigEntry, DeviceIdentifier, DeviceInfo, PLATFORMS};
use crate::{MANUFACTURER, MODEL};

/// A paired remote with a live API session.
pub struct RemoteDevice {
    entry: ConfigEntry,
    api: Arc<dyn RemoteApi>,
    /// Identity fetched at setup.
    info: VersionInfo,
    host: Arc<dyn Host>,
    teardowns: Mutex<Vec<Teardown>>,
}

impl RemoteDevice {
    /// Connect to the remote behind `entry` and bring it up.
    ///
    /// Any client failure fails setup; nothing is retried here. On success
    /// the device is in the integration's registry, listens for entry
    /// updates and has been forwarded to every platform.
    pub async fn setup(
        integration: &Integration,
        entry: ConfigEntry,
    ) -> Result<Arc<Self>, CoreError> {
        let profile = &entry.profile;
        let credentials = Credentials::ApiKey(profile.api_key.clone());

        let api = integration
            .connector()
            .connect(profile.url.as_str(), credentials)
            .inspect_err(|e| error!(endpoint = %profile.url, error = %e, "invalid remote endpoint"))?;

        let info = match api.info().await {
            Ok(info) => info,
            Err(e) => {
                error!(endpoint = %profile.url, error = %e, "unable to connect to remote");
                return Err(e.into());
            }
        };

        let device = Arc::new(Self {
            entry,
            api,
            info,
            host: integration.host(),
            teardowns: Mutex::new(Vec::new()),
        });
        let entry_id = device.entry.entry_id.as_str();

        integration.registry().insert(entry_id, Arc::clone(&device))?;
        device.push_teardown(integration.add_update_listener(entry_id));

        if let Err(e) = device
            .host
            .forward_entry_setups(&device.entry, PLATFORMS)
            .await
        {
            error!(entry_id, error = %e, "platform setup failed");
            device.run_teardowns();
            integration.registry().remove(entry_id);
            return Err(e);
        }

        info!(
            entry_id,
            name = device.name(),
            endpoint = %device.endpoint(),
            "remote set up"
        );
        Ok(device)
    }

    /// Run every teardown callback, then unload the forwarded platforms.
    ///
    /// Leaves the registry alone; [`Integration::unload_entry`] removes the
    /// device once this reports success.
    pub async fn unload(&self) -> bool {
        self.run_teardowns();
        let ok = self.host.unload_platforms(&self.entry, PLATFORMS).await;
        debug!(entry_id = %self.entry.entry_id, ok, "platforms unloaded");
        ok
    }

    fn push_teardown(&self, teardown: Teardown) {
        self.teardowns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(teardown);
    }

    fn run_teardowns(&self) {
        let jobs = {
            let mut teardowns = self.teardowns.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *teardowns)
        };
        for job in jobs {
            job();
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Device-reported name, as of setup.
    pub fn name(&self) -> &str {
        &self.info.device_name
    }

    /// User-chosen entry title.
    pub fn title(&self) -> &str {
        &self.entry.title
    }

    pub fn endpoint(&self) -> &Url {
        self.api.endpoint()
    }

    pub fn unique_id(&self) -> &str {
        &self.entry.unique_id
    }

    pub fn device_type(&self) -> &str {
        &self.entry.profile.device_type
    }

    pub fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    /// Software versions as of setup.
    pub fn version(&self) -> &VersionInfo {
        &self.info
    }

    pub fn api(&self) -> Arc<dyn RemoteApi> {
        Arc::clone(&self.api)
    }

    pub fn identifier(&self) -> DeviceIdentifier {
        DeviceIdentifier::new(self.unique_id())
    }

    /// Device card for the host's registry.
    ///
    /// Re-reads the API version so firmware updates show up; keeps the
    /// version seen at setup when the remote doesn't answer.
    pub async fn device_info(&self) -> DeviceInfo {
        let sw_version = match self.api.info().await {
            Ok(current) => current.api.or_else(|| self.info.api.clone()),
            Err(e) => {
                debug!(endpoint = %self.endpoint(), error = %e, "using cached version");
                self.info.api.clone()
            }
        };

        DeviceInfo {
            identifier: self.identifier(),
            name: self.name().to_owned(),
            manufacturer: MANUFACTURER.to_owned(),
            model: MODEL.to_owned(),
            sw_version,
        }
    }
}

impl std::fmt::Debug for RemoteDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDevice")
            .field("entry_id", &self.entry.entry_id)
            .field("name", &self.info.device_name)
            .field("endpoint", &self.api.endpoint().as_str())
            .finish_non_exhaustive()
    }
}
