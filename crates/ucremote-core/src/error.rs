// ── Core error types ──
//
// Errors the integration layer hands back to its host. The
// `From<ucremote_api::Error>` impl folds the client taxonomy into the
// handful of cases a host can act on.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to remote at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Invalid endpoint: {message}")]
    InvalidEndpoint { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Entry {entry_id} is already set up")]
    AlreadySetUp { entry_id: String },

    #[error("Entry {entry_id} is not set up")]
    NotSetUp { entry_id: String },

    #[error("Host rejected {operation}: {message}")]
    Host { operation: String, message: String },

    // ── Command errors ───────────────────────────────────────────────
    #[error("No target device given for the command")]
    MissingTarget,

    #[error("IR target error: {message}")]
    Target { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ucremote_api::Error> for CoreError {
    fn from(err: ucremote_api::Error) -> Self {
        use ucremote_api::Error as ApiError;

        match err {
            ApiError::Connection { url, reason } => CoreError::ConnectionFailed { url, reason },
            ApiError::Timeout { url } => CoreError::Timeout { url },
            ApiError::InvalidUrl(e) => CoreError::InvalidEndpoint {
                message: e.to_string(),
            },
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            e @ (ApiError::CodeSetNotFound { .. }
            | ApiError::NoDefaultEmitter { .. }
            | ApiError::EmitterNotFound { .. }) => CoreError::Target {
                message: e.to_string(),
            },
            ApiError::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Unexpected response: {message}"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_errors_keep_their_message() {
        let err: CoreError = ucremote_api::Error::EmitterNotFound {
            name: "Dock".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Target { ref message } if message.contains("Dock")));
    }

    #[test]
    fn timeouts_stay_timeouts() {
        let err: CoreError = ucremote_api::Error::Timeout {
            url: "http://remote/api/pub/version".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Timeout { .. }));
    }
}
