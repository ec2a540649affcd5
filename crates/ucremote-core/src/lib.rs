//! Integration layer between `ucremote-api` and a home-automation host.
//!
//! - **[`PairingFlow`]**: typestate wizard (`user`/`zeroconf` → `auth` →
//!   `finish`) that turns an endpoint and the remote's PIN into a
//!   [`NewEntry`] carrying a freshly issued API key.
//! - **[`RemoteDevice`]**: one authenticated session per stored
//!   [`ConfigEntry`], with setup/unload hooks driven by the host.
//! - **[`RemoteEntity`]**: the `remote` platform entity. Polls activities,
//!   forwards IR commands and reports availability.
//! - **[`Integration`]**: context object owning the [`DeviceRegistry`],
//!   the [`Host`] handle and the [`Connector`] used to build clients.

pub mod connector;
pub mod device;
pub mod error;
pub mod flow;
pub mod host;
pub mod integration;
pub mod model;
pub mod registry;
pub mod remote;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use connector::{Connector, HttpConnector};
pub use device::RemoteDevice;
pub use error::CoreError;
pub use flow::{
    AbortReason, AuthOutcome, DiscoveryOutcome, EntryOutcome, FlowError, FlowSource, PairingFlow,
};
pub use host::{Host, Teardown};
pub use integration::Integration;
pub use model::{
    ConfigEntry, ConnectionProfile, DeviceIdentifier, DeviceInfo, NewEntry, PLATFORMS, Platform,
    ZeroconfInfo,
};
pub use registry::DeviceRegistry;
pub use remote::{CommandOutcome, RemoteEntity, SendOptions, SendReport};

// ── Constants ───────────────────────────────────────────────────────

/// Integration domain; first half of every device identifier.
pub const DOMAIN: &str = "unfoldedcircle";

pub const MANUFACTURER: &str = "Unfolded Circle";

/// Model reported for every paired remote.
pub const MODEL: &str = "Remote Two";

/// Prefix of the API keys this integration issues.
pub const API_KEY_PREFIX: &str = "ucremote";

pub const API_KEY_SCOPES: &[&str] = &["admin"];
