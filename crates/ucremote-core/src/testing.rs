// In-memory stand-ins for the remote, the connector and the host.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ucremote_api::{
    Activity, ActivityAttributes, ApiKeyInfo, AuthStrategy, Credentials, Error, IrTarget,
    LocalizedText, NewApiKey, RemoteApi, RemoteClient, VersionInfo,
};
use url::Url;

use crate::connector::Connector;
use crate::error::CoreError;
use crate::host::Host;
use crate::integration::Integration;
use crate::model::{ConfigEntry, ConnectionProfile, DeviceIdentifier, Platform};

pub(crate) const ENDPOINT: &str = "http://192.168.1.20/api/";

pub(crate) fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) type ErrorFn = fn() -> Error;

pub(crate) fn connection_error() -> Error {
    Error::Connection {
        url: ENDPOINT.into(),
        reason: "connection refused".into(),
    }
}

// ── Fake remote ──────────────────────────────────────────────────────

pub(crate) struct FakeApi {
    endpoint: Url,
    pub info: Mutex<VersionInfo>,
    pub fail_info: Mutex<Option<ErrorFn>>,
    pub activities: Mutex<Vec<Activity>>,
    pub fail_activities: Mutex<Option<ErrorFn>>,
    pub keys: Mutex<Vec<ApiKeyInfo>>,
    pub fail_add_key: Mutex<Option<ErrorFn>>,
    pub added_keys: Mutex<Vec<(String, Vec<String>)>>,
    pub failing_commands: Mutex<HashMap<String, ErrorFn>>,
    pub sent: Mutex<Vec<(IrTarget, String)>>,
    pub calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            endpoint: RemoteClient::normalize_endpoint(ENDPOINT).expect("endpoint"),
            info: Mutex::new(VersionInfo {
                device_name: "Remote Two".into(),
                hostname: Some("RemoteTwo-AABBCC".into()),
                api: Some("0.31.2".into()),
                core: None,
                os: None,
            }),
            fail_info: Mutex::new(None),
            activities: Mutex::new(Vec::new()),
            fail_activities: Mutex::new(None),
            keys: Mutex::new(Vec::new()),
            fail_add_key: Mutex::new(None),
            added_keys: Mutex::new(Vec::new()),
            failing_commands: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteApi for FakeApi {
    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn info(&self) -> Result<VersionInfo, Error> {
        self.call();
        match *guard(&self.fail_info) {
            Some(fail) => Err(fail()),
            None => Ok(guard(&self.info).clone()),
        }
    }

    async fn add_api_key(&self, name: &str, scopes: &[&str]) -> Result<NewApiKey, Error> {
        self.call();
        if let Some(fail) = *guard(&self.fail_add_key) {
            return Err(fail());
        }
        guard(&self.added_keys).push((
            name.to_owned(),
            scopes.iter().map(|s| (*s).to_owned()).collect(),
        ));
        Ok(NewApiKey {
            key_id: Some("k-new".into()),
            name: name.to_owned(),
            api_key: "issued-secret".to_string().into(),
        })
    }

    async fn api_keys(&self) -> Result<Vec<ApiKeyInfo>, Error> {
        self.call();
        Ok(guard(&self.keys).clone())
    }

    async fn activities(&self) -> Result<Vec<Activity>, Error> {
        self.call();
        match *guard(&self.fail_activities) {
            Some(fail) => Err(fail()),
            None => Ok(guard(&self.activities).clone()),
        }
    }

    async fn send_ir_command(
        &self,
        target: &IrTarget,
        command: &str,
        _repeat: Option<u32>,
    ) -> Result<(), Error> {
        self.call();
        if let Some(fail) = guard(&self.failing_commands).get(command) {
            return Err(fail());
        }
        guard(&self.sent).push((target.clone(), command.to_owned()));
        Ok(())
    }
}

pub(crate) fn activity(name: &str, state: &str) -> Activity {
    Activity {
        entity_id: format!("uc.main.{}", name.to_lowercase().replace(' ', "_")),
        name: LocalizedText::from([("en", name)]),
        enabled: Some(true),
        attributes: Some(ActivityAttributes {
            state: Some(state.to_owned()),
        }),
    }
}

// ── Fake connector ───────────────────────────────────────────────────

pub(crate) struct FakeConnector {
    api: Arc<FakeApi>,
    pub connects: Mutex<Vec<(String, AuthStrategy)>>,
    pub fail: Mutex<Option<ErrorFn>>,
}

impl FakeConnector {
    pub fn new(api: Arc<FakeApi>) -> Arc<Self> {
        Arc::new(Self {
            api,
            connects: Mutex::new(Vec::new()),
            fail: Mutex::new(None),
        })
    }

    pub fn strategies(&self) -> Vec<AuthStrategy> {
        guard(&self.connects).iter().map(|(_, s)| *s).collect()
    }
}

impl Connector for FakeConnector {
    fn connect(
        &self,
        endpoint: &str,
        credentials: Credentials,
    ) -> Result<Arc<dyn RemoteApi>, Error> {
        guard(&self.connects).push((endpoint.to_owned(), credentials.strategy()));
        if let Some(fail) = *guard(&self.fail) {
            return Err(fail());
        }
        Ok(Arc::clone(&self.api) as Arc<dyn RemoteApi>)
    }
}

// ── Fake host ────────────────────────────────────────────────────────

pub(crate) struct FakeHost {
    pub configured: Mutex<HashSet<String>>,
    pub forwarded: Mutex<Vec<(String, Vec<Platform>)>>,
    pub unloaded: Mutex<Vec<String>>,
    pub renamed: Mutex<Vec<(DeviceIdentifier, String)>>,
    pub unload_ok: AtomicBool,
    pub fail_forward: AtomicBool,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            configured: Mutex::new(HashSet::new()),
            forwarded: Mutex::new(Vec::new()),
            unloaded: Mutex::new(Vec::new()),
            renamed: Mutex::new(Vec::new()),
            unload_ok: AtomicBool::new(true),
            fail_forward: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl Host for FakeHost {
    fn is_configured(&self, unique_id: &str) -> bool {
        guard(&self.configured).contains(unique_id)
    }

    async fn forward_entry_setups(
        &self,
        entry: &ConfigEntry,
        platforms: &[Platform],
    ) -> Result<(), CoreError> {
        if self.fail_forward.load(Ordering::SeqCst) {
            return Err(CoreError::Host {
                operation: "forward".into(),
                message: "platform crashed".into(),
            });
        }
        guard(&self.forwarded).push((entry.entry_id.clone(), platforms.to_vec()));
        Ok(())
    }

    async fn unload_platforms(&self, entry: &ConfigEntry, _platforms: &[Platform]) -> bool {
        guard(&self.unloaded).push(entry.entry_id.clone());
        self.unload_ok.load(Ordering::SeqCst)
    }

    async fn update_device_name(
        &self,
        identifier: &DeviceIdentifier,
        name: &str,
    ) -> Result<(), CoreError> {
        guard(&self.renamed).push((identifier.clone(), name.to_owned()));
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

pub(crate) struct Fixture {
    pub api: Arc<FakeApi>,
    pub connector: Arc<FakeConnector>,
    pub host: Arc<FakeHost>,
    pub integration: Integration,
}

pub(crate) fn fixture() -> Fixture {
    let api = FakeApi::new();
    let connector = FakeConnector::new(Arc::clone(&api));
    let host = FakeHost::new();
    let integration = Integration::new(
        Arc::clone(&host) as Arc<dyn Host>,
        Arc::clone(&connector) as Arc<dyn Connector>,
    );
    Fixture {
        api,
        connector,
        host,
        integration,
    }
}

pub(crate) fn entry(entry_id: &str, title: &str) -> ConfigEntry {
    ConfigEntry {
        entry_id: entry_id.to_owned(),
        title: title.to_owned(),
        unique_id: ENDPOINT.to_owned(),
        profile: ConnectionProfile {
            url: Url::parse(ENDPOINT).expect("endpoint"),
            api_key: "stored-key".to_string().into(),
            api_key_name: "ucremote-0011aabb".into(),
            device_type: crate::MODEL.into(),
        },
    }
}
