use std::sync::Arc;

use ucremote_api::{Credentials, Error, RemoteApi, RemoteClient, TransportConfig};

/// Produces API clients for an endpoint.
///
/// The flow and the device wrapper never build clients themselves, so a
/// fake device can be injected.
pub trait Connector: Send + Sync {
    fn connect(&self, endpoint: &str, credentials: Credentials)
    -> Result<Arc<dyn RemoteApi>, Error>;
}

/// Builds real HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    transport: TransportConfig,
}

impl HttpConnector {
    pub fn new(transport: TransportConfig) -> Self {
        Self { transport }
    }
}

impl Connector for HttpConnector {
    fn connect(
        &self,
        endpoint: &str,
        credentials: Credentials,
    ) -> Result<Arc<dyn RemoteApi>, Error> {
        let client = RemoteClient::new(endpoint, credentials, &self.transport)?;
        Ok(Arc::new(client))
    }
}
