use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::device::RemoteDevice;
use crate::error::CoreError;

/// Map from config entry id to its set-up device.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: RwLock<HashMap<String, Arc<RemoteDevice>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `device` under `entry_id`; an existing registration is
    /// left untouched and reported as [`CoreError::AlreadySetUp`].
    pub fn insert(&self, entry_id: &str, device: Arc<RemoteDevice>) -> Result<(), CoreError> {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        if devices.contains_key(entry_id) {
            return Err(CoreError::AlreadySetUp {
                entry_id: entry_id.to_owned(),
            });
        }
        devices.insert(entry_id.to_owned(), device);
        Ok(())
    }

    pub fn remove(&self, entry_id: &str) -> Option<Arc<RemoteDevice>> {
        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(entry_id)
    }

    pub fn get(&self, entry_id: &str) -> Option<Arc<RemoteDevice>> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entry_id)
            .cloned()
    }

    pub fn contains(&self, entry_id: &str) -> bool {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(entry_id)
    }

    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry ids currently set up, sorted.
    pub fn entry_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("entries", &self.entry_ids())
            .finish()
    }
}
