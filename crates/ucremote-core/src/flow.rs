// ── Pairing flow ──
//
// Three-step wizard turning an endpoint and a PIN into a stored entry:
//
//   user / zeroconf ──► auth ──► finish
//
// Each step consumes the flow and hands back an outcome: the next step,
// the same step again with an error code for the form, or an abort. The
// state type parameter makes out-of-order submissions a compile error.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info, warn};
use ucremote_api::{Credentials, Error as ApiError, NewApiKey, RemoteApi, RemoteClient};
use url::Url;
use uuid::Uuid;

use crate::connector::Connector;
use crate::host::Host;
use crate::integration::Integration;
use crate::model::{ConnectionProfile, NewEntry, ZeroconfInfo};
use crate::{API_KEY_PREFIX, API_KEY_SCOPES, MODEL};

// ── Form codes ───────────────────────────────────────────────────────

/// Error code shown on a re-displayed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FlowError {
    /// The remote did not answer or answered garbage.
    Connection,
    /// The PIN was rejected.
    Auth,
    Timeout,
    /// No client could be built for the endpoint.
    CannotConnect,
}

impl FlowError {
    fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::Authentication { .. } => Self::Auth,
            ApiError::Timeout { .. } => Self::Timeout,
            ApiError::Connection { .. }
            | ApiError::InvalidUrl(_)
            | ApiError::CodeSetNotFound { .. }
            | ApiError::NoDefaultEmitter { .. }
            | ApiError::EmitterNotFound { .. }
            | ApiError::Api { .. }
            | ApiError::Deserialization { .. } => Self::Connection,
        }
    }
}

/// Why a flow ended without an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AbortReason {
    AlreadyConfigured,
    CannotConnect,
}

/// How the flow was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowSource {
    User,
    Zeroconf,
}

// ── States ───────────────────────────────────────────────────────────

mod sealed {
    pub trait Sealed {}
}

/// A wizard step. Implemented only by the state types below.
pub trait Step: sealed::Sealed {
    const ID: &'static str;
}

/// Waiting for the operator to type an endpoint.
#[derive(Debug)]
pub struct Entry;

/// Endpoint reachable; waiting for the PIN.
pub struct Auth {
    endpoint: Url,
    device_name: String,
}

/// API key issued; waiting for the display name.
pub struct Finish {
    endpoint: Url,
    device_name: String,
    api_key_name: String,
    api_key: SecretString,
}

impl sealed::Sealed for Entry {}
impl sealed::Sealed for Auth {}
impl sealed::Sealed for Finish {}

impl Step for Entry {
    const ID: &'static str = "user";
}
impl Step for Auth {
    const ID: &'static str = "auth";
}
impl Step for Finish {
    const ID: &'static str = "finish";
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Result of submitting the `user` form.
pub enum EntryOutcome {
    Advance(PairingFlow<Auth>),
    Retry(PairingFlow<Entry>, FlowError),
    Abort(AbortReason),
}

/// Result of a zeroconf discovery. There is no form to re-show.
pub enum DiscoveryOutcome {
    Advance(PairingFlow<Auth>),
    Abort(AbortReason),
}

/// Result of submitting the `auth` form.
pub enum AuthOutcome {
    Advance(PairingFlow<Finish>),
    Retry(PairingFlow<Auth>, FlowError),
}

// ── Flow ─────────────────────────────────────────────────────────────

/// One in-progress pairing. Dropping it abandons the wizard.
pub struct PairingFlow<S: Step> {
    connector: Arc<dyn Connector>,
    host: Arc<dyn Host>,
    source: FlowSource,
    state: S,
}

impl<S: Step> PairingFlow<S> {
    /// Form id of the current step (`user`, `auth` or `finish`).
    pub fn step_id(&self) -> &'static str {
        S::ID
    }

    pub fn source(&self) -> FlowSource {
        self.source
    }

    fn advance<T: Step>(self, next: impl FnOnce(S) -> T) -> PairingFlow<T> {
        debug!(from = S::ID, to = T::ID, "pairing step");
        PairingFlow {
            connector: self.connector,
            host: self.host,
            source: self.source,
            state: next(self.state),
        }
    }
}

/// Why the shared endpoint setup failed.
enum SetupFailure {
    AlreadyConfigured,
    Unreachable(ApiError),
}

impl PairingFlow<Entry> {
    /// Start a flow from the `user` form.
    pub fn user(integration: &Integration) -> Self {
        Self {
            connector: integration.connector(),
            host: integration.host(),
            source: FlowSource::User,
            state: Entry,
        }
    }

    /// Start a flow from a discovery announcement; skips the `user` form.
    pub async fn zeroconf(integration: &Integration, discovery: ZeroconfInfo) -> DiscoveryOutcome {
        let flow = Self {
            connector: integration.connector(),
            host: integration.host(),
            source: FlowSource::Zeroconf,
            state: Entry,
        };
        let endpoint = discovery.endpoint();

        match flow.setup_api(&endpoint).await {
            Ok(auth) => {
                debug!(%endpoint, "remote discovered");
                DiscoveryOutcome::Advance(flow.advance(|Entry| auth))
            }
            Err(SetupFailure::AlreadyConfigured) => {
                DiscoveryOutcome::Abort(AbortReason::AlreadyConfigured)
            }
            Err(SetupFailure::Unreachable(e)) => {
                debug!(%endpoint, error = %e, "discovered remote unreachable");
                DiscoveryOutcome::Abort(AbortReason::CannotConnect)
            }
        }
    }

    /// Submit the endpoint typed by the operator.
    pub async fn submit_endpoint(self, url: &str) -> EntryOutcome {
        match self.setup_api(url).await {
            Ok(auth) => EntryOutcome::Advance(self.advance(|Entry| auth)),
            Err(SetupFailure::AlreadyConfigured) => {
                EntryOutcome::Abort(AbortReason::AlreadyConfigured)
            }
            Err(SetupFailure::Unreachable(e)) => {
                debug!(url, error = %e, "remote unreachable");
                EntryOutcome::Retry(self, FlowError::Connection)
            }
        }
    }

    /// Pin the endpoint as unique id, refuse duplicates, then check the
    /// remote answers.
    async fn setup_api(&self, raw: &str) -> Result<Auth, SetupFailure> {
        let endpoint = RemoteClient::normalize_endpoint(raw).map_err(SetupFailure::Unreachable)?;

        if self.host.is_configured(endpoint.as_str()) {
            debug!(%endpoint, "already configured");
            return Err(SetupFailure::AlreadyConfigured);
        }

        let client = self
            .connector
            .connect(endpoint.as_str(), Credentials::None)
            .map_err(SetupFailure::Unreachable)?;
        let info = client.info().await.map_err(SetupFailure::Unreachable)?;

        Ok(Auth {
            endpoint,
            device_name: info.device_name,
        })
    }
}

impl PairingFlow<Auth> {
    pub fn endpoint(&self) -> &Url {
        &self.state.endpoint
    }

    /// Name the remote reports for itself.
    pub fn device_name(&self) -> &str {
        &self.state.device_name
    }

    /// Submit the PIN shown on the remote and request an API key with it.
    pub async fn submit_pin(self, pin: SecretString) -> AuthOutcome {
        match self.request_key(pin).await {
            Ok(key) => {
                info!(endpoint = %self.state.endpoint, key = %key.name, "API key issued");
                AuthOutcome::Advance(self.advance(|auth| Finish {
                    endpoint: auth.endpoint,
                    device_name: auth.device_name,
                    api_key_name: key.name,
                    api_key: key.api_key,
                }))
            }
            Err(code) => AuthOutcome::Retry(self, code),
        }
    }

    async fn request_key(&self, pin: SecretString) -> Result<NewApiKey, FlowError> {
        let client = self
            .connector
            .connect(self.state.endpoint.as_str(), Credentials::Pin(pin))
            .map_err(|e| {
                warn!(error = %e, "cannot build client for pairing");
                FlowError::CannotConnect
            })?;

        warn_on_stale_keys(client.as_ref()).await;

        let name = generate_key_name(API_KEY_PREFIX);
        client
            .add_api_key(&name, API_KEY_SCOPES)
            .await
            .map_err(|e| {
                debug!(error = %e, "API key request failed");
                FlowError::from_api(&e)
            })
    }
}

impl PairingFlow<Finish> {
    /// Default for the name form: the device-reported name.
    pub fn default_name(&self) -> &str {
        &self.state.device_name
    }

    pub fn api_key_name(&self) -> &str {
        &self.state.api_key_name
    }

    /// Submit the display name and produce the entry to store. A blank
    /// name keeps the default.
    pub fn submit_name(self, name: &str) -> NewEntry {
        let Finish {
            endpoint,
            device_name,
            api_key_name,
            api_key,
        } = self.state;

        let name = name.trim();
        let title = if name.is_empty() {
            device_name
        } else {
            name.to_owned()
        };

        info!(%title, %endpoint, source = %self.source, "pairing complete");
        NewEntry {
            title,
            unique_id: endpoint.to_string(),
            profile: ConnectionProfile {
                url: endpoint,
                api_key,
                api_key_name,
                device_type: MODEL.to_owned(),
            },
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// `"{prefix}-{8 hex chars}"`.
pub fn generate_key_name(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("{prefix}-{suffix}")
}

/// Earlier pairings leave keys behind on the remote; nothing removes them.
/// Returns the names warned about.
async fn warn_on_stale_keys(client: &dyn RemoteApi) -> Vec<String> {
    let keys = match client.api_keys().await {
        Ok(keys) => keys,
        Err(e) => {
            debug!(error = %e, "cannot list existing API keys");
            return Vec::new();
        }
    };
    keys.into_iter()
        .filter(|k| k.name.starts_with(API_KEY_PREFIX))
        .map(|k| {
            warn!(name = %k.name, "API key from an earlier pairing is still present");
            k.name
        })
        .collect()
}
