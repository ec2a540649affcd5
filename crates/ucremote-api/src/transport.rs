// Shared transport configuration for building reqwest::Client instances.
//
// Every RemoteClient gets its timeout and user agent from here; credentials
// are applied per request by the client itself.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("ucremote/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Connection {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
