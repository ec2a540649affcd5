// ── Integration context ──
//
// Owns everything shared between config entries: the host handle, the
// client connector, the device registry and the set of entries listening
// for updates. Hosts drive the lifecycle exclusively through this type.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info};

use crate::connector::Connector;
use crate::device::RemoteDevice;
use crate::error::CoreError;
use crate::host::{Host, Teardown};
use crate::model::{ConfigEntry, DeviceIdentifier};
use crate::registry::DeviceRegistry;

type ListenerSet = Arc<Mutex<HashSet<String>>>;

pub struct Integration {
    host: Arc<dyn Host>,
    connector: Arc<dyn Connector>,
    registry: DeviceRegistry,
    listeners: ListenerSet,
}

impl Integration {
    pub fn new(host: Arc<dyn Host>, connector: Arc<dyn Connector>) -> Self {
        Self {
            host,
            connector,
            registry: DeviceRegistry::new(),
            listeners: Arc::default(),
        }
    }

    pub fn host(&self) -> Arc<dyn Host> {
        Arc::clone(&self.host)
    }

    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::clone(&self.connector)
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// The set-up device for `entry_id`, if any.
    pub fn device(&self, entry_id: &str) -> Option<Arc<RemoteDevice>> {
        self.registry.get(entry_id)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Set up a stored entry.
    pub async fn setup_entry(&self, entry: ConfigEntry) -> Result<Arc<RemoteDevice>, CoreError> {
        if self.registry.contains(&entry.entry_id) {
            error!(entry_id = %entry.entry_id, endpoint = %entry.profile.url, "device already set up");
            return Err(CoreError::AlreadySetUp {
                entry_id: entry.entry_id,
            });
        }
        RemoteDevice::setup(self, entry).await
    }

    /// Unload an entry's device. The registry entry is dropped only when
    /// the host unloaded every platform.
    pub async fn unload_entry(&self, entry_id: &str) -> Result<bool, CoreError> {
        let device = self.registry.get(entry_id).ok_or_else(|| CoreError::NotSetUp {
            entry_id: entry_id.to_owned(),
        })?;

        let ok = device.unload().await;
        if ok {
            self.registry.remove(entry_id);
            info!(entry_id, "remote unloaded");
        }
        Ok(ok)
    }

    /// Unload (if set up) and set up again with `entry`.
    pub async fn reload_entry(&self, entry: ConfigEntry) -> Result<Arc<RemoteDevice>, CoreError> {
        if self.registry.contains(&entry.entry_id) && !self.unload_entry(&entry.entry_id).await? {
            return Err(CoreError::Host {
                operation: "unload".into(),
                message: format!("platforms of {} did not unload", entry.entry_id),
            });
        }
        self.setup_entry(entry).await
    }

    /// React to the user editing an entry: rename the device in the host's
    /// registry to the new title and reload. Ignored for entries nobody is
    /// listening on.
    pub async fn entry_updated(&self, entry: ConfigEntry) -> Result<(), CoreError> {
        if !self.has_update_listener(&entry.entry_id) {
            debug!(entry_id = %entry.entry_id, "no update listener, ignoring");
            return Ok(());
        }

        let identifier = DeviceIdentifier::new(entry.unique_id.as_str());
        self.host
            .update_device_name(&identifier, &entry.title)
            .await?;
        self.reload_entry(entry).await.map(|_| ())
    }

    // ── Update listeners ─────────────────────────────────────────────

    /// Start listening for updates to `entry_id`. The returned teardown
    /// stops listening; calling it more than once is harmless.
    pub(crate) fn add_update_listener(&self, entry_id: &str) -> Teardown {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry_id.to_owned());

        let listeners = Arc::clone(&self.listeners);
        let entry_id = entry_id.to_owned();
        Box::new(move || {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&entry_id);
        })
    }

    pub fn has_update_listener(&self, entry_id: &str) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(entry_id)
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
