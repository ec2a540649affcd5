// ── Domain model ──
//
// Records shared between the pairing flow, the device wrapper and the host:
// the persisted connection profile, the config entry wrapping it, and the
// identity a device presents to the host's device registry.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::DOMAIN;

// ── Connection profile ───────────────────────────────────────────────

/// What a successful pairing persists for one remote.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    /// Normalized `.../api/` endpoint.
    pub url: Url,
    pub api_key: SecretString,
    pub api_key_name: String,
    pub device_type: String,
}

/// A host's record of one paired remote.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub entry_id: String,
    /// User-chosen display name.
    pub title: String,
    /// Stable identity of the remote; the endpoint.
    pub unique_id: String,
    pub profile: ConnectionProfile,
}

/// The result of a completed pairing flow, before the host assigns it an
/// entry id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub title: String,
    pub unique_id: String,
    pub profile: ConnectionProfile,
}

impl NewEntry {
    pub fn into_entry(self, entry_id: impl Into<String>) -> ConfigEntry {
        ConfigEntry {
            entry_id: entry_id.into(),
            title: self.title,
            unique_id: self.unique_id,
            profile: self.profile,
        }
    }
}

// ── Device identity ──────────────────────────────────────────────────

/// `(domain, unique_id)` key of a device in the host's device registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentifier {
    pub domain: String,
    pub id: String,
}

impl DeviceIdentifier {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            domain: DOMAIN.to_owned(),
            id: unique_id.into(),
        }
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.id)
    }
}

/// Device card shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub identifier: DeviceIdentifier,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: Option<String>,
}

// ── Discovery ────────────────────────────────────────────────────────

/// Payload of a zeroconf announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroconfInfo {
    pub ip_address: IpAddr,
    pub port: u16,
}

impl ZeroconfInfo {
    /// `http://{ip}:{port}/api/`, with IPv6 addresses bracketed.
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/", SocketAddr::new(self.ip_address, self.port))
    }
}

// ── Platforms ────────────────────────────────────────────────────────

/// Entity platforms an entry's setup is forwarded to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Remote,
}

/// Platforms every entry is forwarded to.
pub const PLATFORMS: &[Platform] = &[Platform::Remote];
