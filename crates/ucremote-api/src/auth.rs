use secrecy::{ExposeSecret, SecretString};

/// Username the remote expects for PIN-based basic auth.
pub const PIN_USERNAME: &str = "web-configurator";

/// Which authentication strategy a client uses.
///
/// Marker enum (no data) -- the actual secrets live in [`Credentials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    Anonymous,
    Pin,
    ApiKey,
}

/// Credentials for talking to a remote.
///
/// Each variant carries the secret material needed for its auth flow.
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// No credentials: only the public endpoints (`pub/version`) work.
    #[default]
    None,

    /// The PIN shown on the remote's display. Used during pairing to list
    /// and create API keys (HTTP basic auth as `web-configurator`).
    Pin(SecretString),

    /// A scoped API key issued during pairing (bearer token).
    ApiKey(SecretString),
}

impl Credentials {
    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::None => AuthStrategy::Anonymous,
            Self::Pin(_) => AuthStrategy::Pin,
            Self::ApiKey(_) => AuthStrategy::ApiKey,
        }
    }

    /// Attach these credentials to an outgoing request.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::None => builder,
            Self::Pin(pin) => builder.basic_auth(PIN_USERNAME, Some(pin.expose_secret())),
            Self::ApiKey(key) => builder.bearer_auth(key.expose_secret()),
        }
    }
}
