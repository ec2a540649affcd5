// HTTP client for the remote's REST API.
//
// Wraps `reqwest::Client` with endpoint normalization, per-request
// credentials and status-to-error mapping. The IR resolution logic lives in
// `ir.rs` as further inherent methods to keep this module focused on
// transport mechanics.

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::models::{
    Activity, ApiKeyCreate, ApiKeyInfo, Emitter, IrCodeSet, IrSend, NewApiKey, RemoteEntity,
    VersionInfo,
};
use crate::transport::TransportConfig;

/// Page size for list endpoints; the remote caps `limit` at 100.
const PAGE_LIMIT: &str = "100";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one remote.
///
/// The base URL always ends in `/api/`; every endpoint path is joined
/// relative to it.
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.credentials.strategy())
            .finish_non_exhaustive()
    }
}

impl RemoteClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `endpoint` with the given credentials.
    pub fn new(
        endpoint: &str,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(endpoint, http, credentials)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        endpoint: &str,
        http: reqwest::Client,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_endpoint(endpoint)?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Normalize a user-supplied endpoint to the `/api/` base.
    ///
    /// `http://host` and `http://host/` become `http://host/api/`;
    /// `http://host/api` gains its trailing slash; any other path is kept
    /// and slash-terminated. A bare host or IP is taken as `http://`.
    pub fn normalize_endpoint(raw: &str) -> Result<Url, Error> {
        let raw = raw.trim();
        let mut url = if raw.contains("://") {
            Url::parse(raw)?
        } else {
            Url::parse(&format!("http://{raw}"))?
        };
        let path = url.path().trim_end_matches('/').to_owned();

        if path.is_empty() {
            url.set_path("/api/");
        } else {
            url.set_path(&format!("{path}/"));
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// The normalized endpoint (`.../api/`).
    pub fn endpoint(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join a static relative path (e.g. `"pub/version"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Append percent-encoded path segments to the base URL. Used for paths
    /// carrying entity ids, which contain dots and occasionally spaces.
    fn segments_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<reqwest::Response, Error> {
        self.credentials
            .apply(builder)
            .send()
            .await
            .map_err(|e| Error::from_transport(&e, url))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.send(self.http.get(url.clone()), &url).await?;
        Self::handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self
            .send(self.http.get(url.clone()).query(params), &url)
            .await?;
        Self::handle_response(resp).await
    }

    /// GET that yields `None` on HTTP 404 instead of an error.
    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("GET {url}");

        let resp = self.send(self.http.get(url.clone()), &url).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            trace!("{url} not found");
            return Ok(None);
        }
        Self::handle_response(resp).await.map(Some)
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self
            .send(self.http.post(url.clone()).json(body), &url)
            .await?;
        Self::handle_response(resp).await
    }

    async fn put_no_response<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), Error> {
        debug!("PUT {url}");

        let resp = self
            .send(self.http.put(url.clone()).json(body), &url)
            .await?;
        Self::check_status(resp).await.map(|_| ())
    }

    // ── Response handling ────────────────────────────────────────────

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| body.chars().take(200).collect());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: format!("HTTP {status}: {message}"),
            });
        }

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let url = resp.url().clone();
        let resp = Self::check_status(resp).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_transport(&e, &url))?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Device name and software versions.
    ///
    /// `GET pub/version` -- no authentication required.
    pub async fn get_version(&self) -> Result<VersionInfo, Error> {
        self.get(self.url("pub/version")?).await
    }

    /// List the API keys issued by the remote.
    ///
    /// `GET auth/api_keys`
    pub async fn list_api_keys(&self) -> Result<Vec<ApiKeyInfo>, Error> {
        self.get(self.url("auth/api_keys")?).await
    }

    /// Issue a new API key.
    ///
    /// `POST auth/api_keys` -- requires PIN credentials.
    pub async fn create_api_key(&self, name: &str, scopes: &[&str]) -> Result<NewApiKey, Error> {
        debug!(name, ?scopes, "creating API key");
        self.post(self.url("auth/api_keys")?, &ApiKeyCreate { name, scopes })
            .await
    }

    /// `GET activities`
    pub async fn list_activities(&self) -> Result<Vec<Activity>, Error> {
        self.get_with_params(self.url("activities")?, &[("limit", PAGE_LIMIT)])
            .await
    }

    /// `GET remotes`
    pub async fn list_remotes(&self) -> Result<Vec<RemoteEntity>, Error> {
        self.get_with_params(self.url("remotes")?, &[("limit", PAGE_LIMIT)])
            .await
    }

    /// IR code-set of a remote, `None` if it has none.
    ///
    /// `GET remotes/{entity_id}/ir`
    pub async fn get_remote_codeset(&self, entity_id: &str) -> Result<Option<IrCodeSet>, Error> {
        self.get_optional(self.segments_url(&["remotes", entity_id, "ir"])?)
            .await
    }

    /// `GET ir/emitters`
    pub async fn list_emitters(&self) -> Result<Vec<Emitter>, Error> {
        self.get(self.url("ir/emitters")?).await
    }

    /// Fire one IR command from one emitter.
    ///
    /// `PUT ir/emitters/{device_id}/send`
    pub async fn send_ir(&self, emitter_id: &str, body: &IrSend<'_>) -> Result<(), Error> {
        let url = self.segments_url(&["ir", "emitters", emitter_id, "send"])?;
        self.put_no_response(url, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::RemoteClient;

    #[test]
    fn normalize_appends_api_to_bare_host() {
        let url = RemoteClient::normalize_endpoint("http://192.168.1.20").expect("valid");
        assert_eq!(url.as_str(), "http://192.168.1.20/api/");
    }

    #[test]
    fn normalize_accepts_bare_ip() {
        let url = RemoteClient::normalize_endpoint("192.168.1.20").expect("valid");
        assert_eq!(url.as_str(), "http://192.168.1.20/api/");

        let url = RemoteClient::normalize_endpoint(" 192.168.1.20:8080/api ").expect("valid");
        assert_eq!(url.as_str(), "http://192.168.1.20:8080/api/");
    }

    #[test]
    fn normalize_keeps_api_path_and_adds_slash() {
        let url = RemoteClient::normalize_endpoint("http://remote.local:8080/api").expect("valid");
        assert_eq!(url.as_str(), "http://remote.local:8080/api/");

        let url = RemoteClient::normalize_endpoint("http://remote.local/api/").expect("valid");
        assert_eq!(url.as_str(), "http://remote.local/api/");
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(RemoteClient::normalize_endpoint("not a url").is_err());
        assert!(RemoteClient::normalize_endpoint("http://").is_err());
    }

    #[test]
    fn segments_are_percent_encoded() {
        let client = RemoteClient::from_reqwest(
            "http://remote.local/api/",
            reqwest::Client::new(),
            crate::Credentials::None,
        )
        .expect("valid endpoint");
        let url = client
            .segments_url(&["remotes", "uc.main.living room", "ir"])
            .expect("valid url");
        assert_eq!(
            url.as_str(),
            "http://remote.local/api/remotes/uc.main.living%20room/ir"
        );
    }
}
