use async_trait::async_trait;
use url::Url;

use crate::client::RemoteClient;
use crate::error::Error;
use crate::models::{Activity, ApiKeyInfo, IrTarget, NewApiKey, VersionInfo};

/// The operations the integration layer needs from a remote.
///
/// Implemented by [`RemoteClient`]; consumers hold it as
/// `Arc<dyn RemoteApi>` so tests can substitute a fake device.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// The normalized endpoint this client talks to.
    fn endpoint(&self) -> &Url;

    /// Device name and software versions.
    async fn info(&self) -> Result<VersionInfo, Error>;

    /// Issue a new API key with the given scopes.
    async fn add_api_key(&self, name: &str, scopes: &[&str]) -> Result<NewApiKey, Error>;

    /// List existing API keys.
    async fn api_keys(&self) -> Result<Vec<ApiKeyInfo>, Error>;

    /// All activities, in the order the remote returns them.
    async fn activities(&self) -> Result<Vec<Activity>, Error>;

    /// Fire one IR command at `target`.
    async fn send_ir_command(
        &self,
        target: &IrTarget,
        command: &str,
        repeat: Option<u32>,
    ) -> Result<(), Error>;
}

#[async_trait]
impl RemoteApi for RemoteClient {
    fn endpoint(&self) -> &Url {
        RemoteClient::endpoint(self)
    }

    async fn info(&self) -> Result<VersionInfo, Error> {
        self.get_version().await
    }

    async fn add_api_key(&self, name: &str, scopes: &[&str]) -> Result<NewApiKey, Error> {
        self.create_api_key(name, scopes).await
    }

    async fn api_keys(&self) -> Result<Vec<ApiKeyInfo>, Error> {
        self.list_api_keys().await
    }

    async fn activities(&self) -> Result<Vec<Activity>, Error> {
        self.list_activities().await
    }

    async fn send_ir_command(
        &self,
        target: &IrTarget,
        command: &str,
        repeat: Option<u32>,
    ) -> Result<(), Error> {
        RemoteClient::send_ir_command(self, target, command, repeat).await
    }
}
