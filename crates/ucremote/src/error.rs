//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ConfigError` and pairing form codes into user-facing
//! errors with actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use ucremote_config::ConfigError;
use ucremote_core::{AbortReason, CoreError, FlowError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the remote at {url}")]
    #[diagnostic(
        code(ucremote::connection_failed),
        help(
            "Check that the remote is awake and reachable on the network.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(ucremote::timeout),
        help("Increase the timeout with --timeout or wake the remote up.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The remote rejected the stored API key: {message}")]
    #[diagnostic(
        code(ucremote::auth_failed),
        help(
            "The key may have been revoked on the remote.\n\
             Pair it again with: ucremote pair"
        )
    )]
    AuthFailed { message: String },

    #[error("The remote rejected the PIN")]
    #[diagnostic(
        code(ucremote::pin_rejected),
        help("Use the PIN shown on the remote after enabling the web configurator.")
    )]
    PinRejected,

    #[error("No API key stored for entry '{entry_id}'")]
    #[diagnostic(
        code(ucremote::no_credentials),
        help("Pair the remote again with: ucremote pair")
    )]
    NoCredentials { entry_id: String },

    #[error("Keyring error: {reason}")]
    #[diagnostic(
        code(ucremote::keyring),
        help("Pass --plaintext-key to keep the API key in the config file instead.")
    )]
    Keyring { reason: String },

    // ── Entries ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(ucremote::not_found),
        help("Run: ucremote {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(ucremote::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    #[error("The remote at {url} is already paired")]
    #[diagnostic(
        code(ucremote::already_configured),
        help("Run: ucremote entries list")
    )]
    AlreadyConfigured { url: String },

    #[error("No remotes paired yet")]
    #[diagnostic(code(ucremote::no_entries), help("Pair one with: ucremote pair"))]
    NoEntries,

    #[error("Several remotes are paired and none is the default")]
    #[diagnostic(
        code(ucremote::no_default_entry),
        help(
            "Pick one with --entry <ID>, or set a default with:\n\
             ucremote entries use <ID>"
        )
    )]
    NoDefaultEntry,

    // ── Commands ─────────────────────────────────────────────────────
    #[error("{failed} of {total} IR commands failed")]
    #[diagnostic(
        code(ucremote::commands_failed),
        help("Run with -v to see why each command failed.")
    )]
    CommandsFailed { failed: usize, total: usize },

    #[error("API error: {message}")]
    #[diagnostic(code(ucremote::api_error))]
    Api { message: String },

    #[error("Setup step '{operation}' failed: {message}")]
    #[diagnostic(code(ucremote::host))]
    Host { operation: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ucremote::validation))]
    Validation { field: String, reason: String },

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(ucremote::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(ucremote::config))]
    Config(ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::PinRejected | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::NoEntries => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::AlreadyConfigured { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NoDefaultEntry => exit_code::USAGE,
            Self::Keyring { .. }
            | Self::CommandsFailed { .. }
            | Self::Api { .. }
            | Self::Host { .. }
            | Self::Config(_)
            | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Error for a pairing form that came back with `code` and cannot be
    /// re-prompted.
    pub fn from_flow(code: FlowError, url: &str) -> Self {
        match code {
            FlowError::Auth => Self::PinRejected,
            FlowError::Timeout => Self::Timeout { url: url.into() },
            FlowError::Connection | FlowError::CannotConnect => Self::ConnectionFailed {
                url: url.into(),
                reason: code.to_string(),
            },
        }
    }

    pub fn from_abort(reason: AbortReason, url: &str) -> Self {
        match reason {
            AbortReason::AlreadyConfigured => Self::AlreadyConfigured { url: url.into() },
            AbortReason::CannotConnect => Self::ConnectionFailed {
                url: url.into(),
                reason: reason.to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout { url } => Self::Timeout { url },
            CoreError::InvalidEndpoint { message } => Self::Validation {
                field: "url".into(),
                reason: message,
            },
            CoreError::AlreadySetUp { entry_id } => Self::Conflict {
                resource_type: "entry".into(),
                identifier: entry_id,
            },
            CoreError::NotSetUp { entry_id } => Self::NotFound {
                resource_type: "entry".into(),
                identifier: entry_id,
                list_command: "entries list".into(),
            },
            CoreError::Host { operation, message } => Self::Host { operation, message },
            CoreError::MissingTarget => Self::Validation {
                field: "device".into(),
                reason: "an appliance name is required".into(),
            },
            CoreError::Target { message } | CoreError::Api { message, .. } => {
                Self::Api { message }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownEntry { entry_id } => Self::NotFound {
                resource_type: "entry".into(),
                identifier: entry_id,
                list_command: "entries list".into(),
            },
            ConfigError::NoEntries => Self::NoEntries,
            ConfigError::NoDefaultEntry => Self::NoDefaultEntry,
            ConfigError::NoCredentials { entry_id } => Self::NoCredentials { entry_id },
            ConfigError::Keyring { reason } => Self::Keyring { reason },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other @ (ConfigError::Serialization(_)
            | ConfigError::Figment(_)
            | ConfigError::Io(_)) => Self::Config(other),
        }
    }
}
