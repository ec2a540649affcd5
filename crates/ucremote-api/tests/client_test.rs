#![allow(clippy::unwrap_used)]
// Integration tests for `RemoteClient` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{basic_auth, bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ucremote_api::{
    Credentials, DeviceGroup, Error, IrTarget, RemoteApi, RemoteClient, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn client_for(server: &MockServer, credentials: Credentials) -> RemoteClient {
    RemoteClient::from_reqwest(&server.uri(), reqwest::Client::new(), credentials).unwrap()
}

async fn setup() -> (MockServer, RemoteClient) {
    let server = MockServer::start().await;
    let key: SecretString = "secret-key".to_string().into();
    let client = client_for(&server, Credentials::ApiKey(key));
    (server, client)
}

async fn mount_remotes(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/remotes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "entity_id": "uc.main.tv", "name": { "en": "Living Room TV", "de": "Fernseher" } },
            { "entity_id": "uc.main.amp", "name": { "en": "Amplifier" } }
        ])))
        .mount(server)
        .await;
}

async fn mount_codeset(server: &MockServer, entity_id: &str, codeset: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/remotes/{entity_id}/ir")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": codeset,
            "manufacturer": "Samsung"
        })))
        .mount(server)
        .await;
}

async fn mount_emitters(server: &MockServer, emitters: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/ir/emitters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(emitters))
        .mount(server)
        .await;
}

// ── Endpoint tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_endpoint_is_normalized() {
    let (server, client) = setup().await;
    assert_eq!(client.endpoint().as_str(), format!("{}/api/", server.uri()));
}

// ── Version tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_version() {
    let server = MockServer::start().await;
    let client = client_for(&server, Credentials::None);

    Mock::given(method("GET"))
        .and(path("/api/pub/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_name": "Living Room",
            "hostname": "RemoteTwo-AABBCC",
            "api": "0.31.2",
            "core": "0.40.1",
            "os": "1.9.0"
        })))
        .mount(&server)
        .await;

    let info = client.info().await.unwrap();
    assert_eq!(info.device_name, "Living Room");
    assert_eq!(info.api.as_deref(), Some("0.31.2"));
    assert_eq!(info.hostname.as_deref(), Some("RemoteTwo-AABBCC"));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/pub/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let result = client.get_version().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("nope")),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── API key tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_create_api_key_uses_pin_basic_auth() {
    let server = MockServer::start().await;
    let pin: SecretString = "1234".to_string().into();
    let client = client_for(&server, Credentials::Pin(pin));

    Mock::given(method("POST"))
        .and(path("/api/auth/api_keys"))
        .and(basic_auth("web-configurator", "1234"))
        .and(body_json(json!({ "name": "ucremote-0011aabb", "scopes": ["admin"] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "key_id": "k-1",
            "name": "ucremote-0011aabb",
            "api_key": "issued-secret"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key = client
        .add_api_key("ucremote-0011aabb", &["admin"])
        .await
        .unwrap();
    assert_eq!(key.api_key.expose_secret(), "issued-secret");
    assert!(!format!("{key:?}").contains("issued-secret"));
    assert_eq!(key.name, "ucremote-0011aabb");
}

#[tokio::test]
async fn test_wrong_pin_is_authentication_error() {
    let server = MockServer::start().await;
    let pin: SecretString = "0000".to_string().into();
    let client = client_for(&server, Credentials::Pin(pin));

    Mock::given(method("POST"))
        .and(path("/api/auth/api_keys"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "code": "UNAUTHORIZED", "message": "Invalid PIN" })),
        )
        .mount(&server)
        .await;

    let result = client.add_api_key("ucremote-x", &["admin"]).await;
    assert!(
        matches!(result, Err(Error::Authentication { ref message }) if message.contains("Invalid PIN")),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_list_api_keys_with_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/api_keys"))
        .and(bearer_token("secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "key_id": "k-1", "name": "ucremote-11223344", "prefix": "abc", "scopes": ["admin"], "active": true },
            { "key_id": "k-2", "name": "other-tool", "scopes": ["read"] }
        ])))
        .mount(&server)
        .await;

    let keys = client.api_keys().await.unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].name, "ucremote-11223344");
    assert!(keys[1].active);
}

// ── Activity tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_activities_requests_full_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/activities"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "entity_id": "uc.main.a1", "name": { "en": "Watch TV" }, "attributes": { "state": "ON" } },
            { "entity_id": "uc.main.a2", "name": { "de": "Musik", "en": "Listen to Spotify" }, "attributes": { "state": "OFF" } }
        ])))
        .mount(&server)
        .await;

    let activities = client.activities().await.unwrap();
    let names: Vec<&str> = activities.iter().map(|a| a.display_name()).collect();
    assert_eq!(names, vec!["Watch TV", "Listen to Spotify"]);
    assert!(activities[0].is_on());
    assert!(!activities[1].is_on());
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/activities"))
        .respond_with(ResponseTemplate::new(503).set_body_string("core restarting"))
        .mount(&server)
        .await;

    let result = client.list_activities().await;
    assert!(
        matches!(result, Err(Error::Api { status: 503, ref message }) if message == "core restarting"),
        "expected Api error, got: {result:?}"
    );
}

// ── Transport tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_slow_remote_times_out() {
    let server = MockServer::start().await;
    let transport = TransportConfig::default().with_timeout(Duration::from_millis(100));
    let client = RemoteClient::new(&server.uri(), Credentials::None, &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/pub/version"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "device_name": "Slow" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = client.get_version().await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unreachable_remote_is_connection_error() {
    let client =
        RemoteClient::new("http://127.0.0.1:9/", Credentials::None, &TransportConfig::default())
            .unwrap();

    let result = client.get_version().await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Connection { .. }), "got: {err:?}");
    assert!(err.is_unreachable());
}

// ── IR tests ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_ir_command_resolves_codeset_and_default_emitter() {
    let (server, client) = setup().await;
    mount_remotes(&server).await;
    mount_codeset(&server, "uc.main.tv", "custom.codeset.42").await;
    mount_emitters(&server, json!([{ "device_id": "dock-1", "name": "Dock" }])).await;

    Mock::given(method("PUT"))
        .and(path("/api/ir/emitters/dock-1/send"))
        .and(body_json(json!({ "codeset_id": "custom.codeset.42", "cmd_id": "POWER_ON" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .send_ir_command(&IrTarget::new("Living Room TV"), "POWER_ON", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_ir_command_matches_any_locale_and_named_emitter() {
    let (server, client) = setup().await;
    mount_remotes(&server).await;
    mount_codeset(&server, "uc.main.tv", "cs-1").await;
    mount_emitters(
        &server,
        json!([
            { "device_id": "dock-1", "name": "Dock" },
            { "device_id": "blaster-2", "name": "Blaster" }
        ]),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/api/ir/emitters/blaster-2/send"))
        .and(body_json(json!({ "codeset_id": "cs-1", "cmd_id": "VOLUME_UP", "repeat": 3 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let target = IrTarget::new("Fernseher").with_emitter("Blaster");
    RemoteApi::send_ir_command(&client, &target, "VOLUME_UP", Some(3))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_target_is_codeset_not_found() {
    let (server, client) = setup().await;
    mount_remotes(&server).await;

    let result = client
        .send_ir_command(&IrTarget::new("Projector"), "POWER_ON", None)
        .await;
    assert!(
        matches!(result, Err(Error::CodeSetNotFound { ref target }) if target == "Projector"),
        "expected CodeSetNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn test_remote_without_codeset_is_codeset_not_found() {
    let (server, client) = setup().await;
    mount_remotes(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/remotes/uc.main.amp/ir"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client
        .send_ir_command(&IrTarget::new("Amplifier"), "POWER_ON", None)
        .await;
    assert!(matches!(result, Err(Error::CodeSetNotFound { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_several_emitters_without_name_is_no_default_emitter() {
    let (server, client) = setup().await;
    mount_remotes(&server).await;
    mount_codeset(&server, "uc.main.tv", "cs-1").await;
    mount_emitters(
        &server,
        json!([
            { "device_id": "dock-1", "name": "Dock" },
            { "device_id": "blaster-2", "name": "Blaster" }
        ]),
    )
    .await;

    let result = client
        .send_ir_command(&IrTarget::new("Living Room TV"), "POWER_ON", None)
        .await;
    assert!(
        matches!(result, Err(Error::NoDefaultEmitter { available: 2 })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_unknown_emitter_is_emitter_not_found() {
    let (server, client) = setup().await;
    mount_remotes(&server).await;
    mount_codeset(&server, "uc.main.tv", "cs-1").await;
    mount_emitters(&server, json!([{ "device_id": "dock-1", "name": "Dock" }])).await;

    let target = IrTarget::new("Living Room TV").with_emitter("Kitchen");
    let result = client.send_ir_command(&target, "POWER_ON", None).await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::EmitterNotFound { ref name } if name == "Kitchen"));
    assert!(err.is_target_error());
}

// ── Device group tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_group_skips_members_without_codeset() {
    let (first_server, first) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/remotes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&first_server)
        .await;

    let (second_server, second) = setup().await;
    mount_remotes(&second_server).await;
    mount_codeset(&second_server, "uc.main.tv", "cs-1").await;
    mount_emitters(&second_server, json!([{ "device_id": "dock-1", "name": "Dock" }])).await;
    Mock::given(method("PUT"))
        .and(path("/api/ir/emitters/dock-1/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&second_server)
        .await;

    let members: Vec<Arc<dyn RemoteApi>> = vec![Arc::new(first), Arc::new(second)];
    let group = DeviceGroup::new(members);
    group
        .send_ir_command(&IrTarget::new("Living Room TV"), "POWER_ON", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_group_without_codeset_anywhere() {
    let (server, client) = setup().await;
    mount_remotes(&server).await;

    let group = DeviceGroup::single(Arc::new(client));
    let result = group
        .send_ir_command(&IrTarget::new("Projector"), "POWER_ON", None)
        .await;
    assert!(
        matches!(result, Err(Error::CodeSetNotFound { ref target }) if target == "Projector"),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_group_stops_on_other_errors() {
    let (first_server, first) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/remotes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&first_server)
        .await;

    let (second_server, second) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/remotes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&second_server)
        .await;

    let members: Vec<Arc<dyn RemoteApi>> = vec![Arc::new(first), Arc::new(second)];
    let group = DeviceGroup::new(members);
    let result = group
        .send_ir_command(&IrTarget::new("Living Room TV"), "POWER_ON", None)
        .await;
    assert!(matches!(result, Err(Error::Authentication { .. })), "got: {result:?}");
}
