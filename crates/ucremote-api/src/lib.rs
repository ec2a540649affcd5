// ucremote-api: Async Rust client for the Unfolded Circle remote REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod group;
mod ir;
pub mod models;
pub mod remote_api;
pub mod transport;

pub use auth::{AuthStrategy, Credentials};
pub use client::RemoteClient;
pub use error::Error;
pub use group::DeviceGroup;
pub use models::{
    Activity, ActivityAttributes, ApiKeyInfo, Emitter, IrCodeSet, IrTarget, LocalizedText,
    NewApiKey, RemoteEntity, VersionInfo,
};
pub use remote_api::RemoteApi;
pub use transport::TransportConfig;
