use thiserror::Error;

/// Top-level error type for the `ucremote-api` crate.
///
/// A closed set: every failure the remote's REST API can produce maps onto
/// exactly one variant. `ucremote-core` matches on these exhaustively to
/// decide between wizard error codes, availability flags and log lines.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connectivity ────────────────────────────────────────────────
    /// The remote could not be reached (connection refused, DNS failure,
    /// reset mid-request, etc.)
    #[error("Cannot connect to remote at {url}: {reason}")]
    Connection { url: String, reason: String },

    /// Request timed out.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Authentication ──────────────────────────────────────────────
    /// PIN or API key rejected (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── IR command targets ──────────────────────────────────────────
    /// No remote with the requested name, or it has no IR code-set.
    #[error("No IR code-set found for target '{target}'")]
    CodeSetNotFound { target: String },

    /// No emitter was named and the remote does not have exactly one.
    #[error("Unable to pick a default IR emitter ({available} available)")]
    NoDefaultEmitter { available: usize },

    /// The named emitter does not exist on the remote.
    #[error("IR emitter '{name}' not found")]
    EmitterNotFound { name: String },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status not covered by a more specific variant.
    #[error("Remote API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify a `reqwest` failure into the connectivity variants.
    pub(crate) fn from_transport(err: &reqwest::Error, url: &url::Url) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Connection {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Returns `true` if the remote could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }

    /// Returns `true` if this error concerns the IR target of a command
    /// rather than the remote itself.
    pub fn is_target_error(&self) -> bool {
        matches!(
            self,
            Self::CodeSetNotFound { .. } | Self::NoDefaultEmitter { .. } | Self::EmitterNotFound { .. }
        )
    }
}
