// ── Host seam ──
//
// The home-automation host owns config entries, entity platforms and the
// device registry. The integration only ever reaches it through this trait.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::{ConfigEntry, DeviceIdentifier, Platform};

/// Cleanup registered during setup and run on unload.
pub type Teardown = Box<dyn FnOnce() + Send + Sync>;

/// Services the integration needs from its host.
#[async_trait]
pub trait Host: Send + Sync {
    /// Whether an entry with this unique id is already configured.
    fn is_configured(&self, unique_id: &str) -> bool;

    /// Hand the entry to each entity platform for setup.
    async fn forward_entry_setups(
        &self,
        entry: &ConfigEntry,
        platforms: &[Platform],
    ) -> Result<(), CoreError>;

    /// Tear down the entry's entities. Returns `false` if any platform
    /// refused.
    async fn unload_platforms(&self, entry: &ConfigEntry, platforms: &[Platform]) -> bool;

    /// Rename the device registered under `identifier`.
    async fn update_device_name(
        &self,
        identifier: &DeviceIdentifier,
        name: &str,
    ) -> Result<(), CoreError>;
}
