// Wire types for the remote's REST API.
//
// Field sets are kept to what the integration reads; unknown fields are
// ignored so firmware updates that add fields don't break decoding.

use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Locale the integration uses for display labels.
pub const DISPLAY_LOCALE: &str = "en";

/// Localized text keyed by locale (`{"en": "Watch TV", "de": "Fernsehen"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub BTreeMap<String, String>);

impl LocalizedText {
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// English text if present, else the first locale in key order.
    pub fn display(&self) -> Option<&str> {
        self.get(DISPLAY_LOCALE)
            .or_else(|| self.0.values().next().map(String::as_str))
    }

    /// Whether any locale's text equals `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.0.values().any(|v| v == text)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for LocalizedText {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        )
    }
}

/// `GET pub/version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub device_name: String,
    #[serde(default)]
    pub hostname: Option<String>,
    /// REST API version; reported as the device's software version.
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default)]
    pub core: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
}

/// An entry of `GET auth/api_keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyInfo {
    #[serde(default)]
    pub key_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Body of `POST auth/api_keys`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyCreate<'a> {
    pub name: &'a str,
    pub scopes: &'a [&'a str],
}

/// Response of `POST auth/api_keys`. The only time the secret is visible.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApiKey {
    #[serde(default)]
    pub key_id: Option<String>,
    pub name: String,
    pub api_key: SecretString,
}

/// An entry of `GET activities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub entity_id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub attributes: Option<ActivityAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityAttributes {
    /// `"ON"` while the activity is running.
    #[serde(default)]
    pub state: Option<String>,
}

impl Activity {
    /// Display label: the English name, falling back to any locale and
    /// finally to the entity id.
    pub fn display_name(&self) -> &str {
        self.name.display().unwrap_or(&self.entity_id)
    }

    pub fn is_on(&self) -> bool {
        self.attributes
            .as_ref()
            .and_then(|a| a.state.as_deref())
            .is_some_and(|s| s.eq_ignore_ascii_case("on"))
    }
}

/// An entry of `GET remotes`: a controlled appliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntity {
    pub entity_id: String,
    pub name: LocalizedText,
}

/// `GET remotes/{entity_id}/ir`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrCodeSet {
    pub id: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
}

/// An entry of `GET ir/emitters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emitter {
    pub device_id: String,
    pub name: String,
}

/// Body of `PUT ir/emitters/{device_id}/send`.
#[derive(Debug, Clone, Serialize)]
pub struct IrSend<'a> {
    pub codeset_id: &'a str,
    pub cmd_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u32>,
}

/// Where an IR command goes: the appliance (by remote name) and optionally
/// a specific emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrTarget {
    pub device: String,
    pub emitter: Option<String>,
}

impl IrTarget {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            emitter: None,
        }
    }

    pub fn with_emitter(mut self, emitter: impl Into<String>) -> Self {
        self.emitter = Some(emitter.into());
        self
    }
}
