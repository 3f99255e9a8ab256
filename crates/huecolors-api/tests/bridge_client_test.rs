#![allow(clippy::unwrap_used)]
// Integration tests for `BridgeClient` and `DiscoveryClient` using wiremock.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huecolors_api::{AppId, AuthToken, BridgeClient, DiscoveryClient, Error, LightUpdate, Xy};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BridgeClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BridgeClient::with_client(
        reqwest::Client::new(),
        base_url,
        Some(AuthToken::new("test-key", None)),
    );
    (server, client)
}

fn app_id() -> AppId {
    AppId::new("HueColors", "test")
}

fn light_json(id: &str, on: bool) -> serde_json::Value {
    json!({
        "id": id,
        "id_v1": "/lights/3",
        "owner": { "rid": "device-1", "rtype": "device" },
        "metadata": { "name": "Desk", "archetype": "sultan_bulb" },
        "on": { "on": on },
        "dimming": { "brightness": 55.5 },
        "color": { "xy": { "x": 0.4, "y": 0.35 }, "gamut_type": "C" }
    })
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_discover_bridges() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "001788fffe123456", "internalipaddress": "192.168.1.20", "port": 443 },
            { "id": "001788fffeabcdef", "internalipaddress": "192.168.1.21" }
        ])))
        .mount(&server)
        .await;

    let client = DiscoveryClient::with_client(
        reqwest::Client::new(),
        Url::parse(&format!("{}/", server.uri())).unwrap(),
    );
    let bridges = client.discover().await.unwrap();

    assert_eq!(bridges.len(), 2);
    assert_eq!(bridges[0].id, "001788fffe123456");
    assert_eq!(bridges[1].internal_ip_address, "192.168.1.21");
    assert_eq!(bridges[1].port, 443);
}

#[tokio::test]
async fn test_discover_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let client = DiscoveryClient::with_client(
        reqwest::Client::new(),
        Url::parse(&format!("{}/", server.uri())).unwrap(),
    );
    let err = client.discover().await.unwrap_err();

    assert!(err.is_transient(), "expected transient error, got: {err:?}");
    assert!(matches!(err, Error::Bridge { status: 429, .. }));
}

// ── Pairing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_token_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_json(json!({
            "devicetype": "HueColors#test",
            "generateclientkey": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "app-key-1", "clientkey": "CLIENTKEY" } }
        ])))
        .mount(&server)
        .await;

    let token = client.request_token(&app_id()).await.unwrap();
    assert_eq!(token.application_key.expose_secret(), "app-key-1");
    assert_eq!(token.client_key_or_empty(), "CLIENTKEY");
}

#[tokio::test]
async fn test_request_token_link_button_not_pressed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "address": "", "description": "link button not pressed" } }
        ])))
        .mount(&server)
        .await;

    let result = client.request_token(&app_id()).await;
    assert!(
        matches!(result, Err(Error::LinkButtonNotPressed)),
        "expected LinkButtonNotPressed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_request_token_other_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 7, "address": "/devicetype", "description": "invalid value" } }
        ])))
        .mount(&server)
        .await;

    let result = client.request_token(&app_id()).await;
    match result {
        Err(Error::Pairing { code, description }) => {
            assert_eq!(code, 7);
            assert_eq!(description, "invalid value");
        }
        other => panic!("expected Pairing error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_await_token_retries_until_button_pressed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "description": "link button not pressed" } }
        ])))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "app-key-2" } }
        ])))
        .mount(&server)
        .await;

    let token = client
        .await_token(
            &app_id(),
            Duration::from_secs(5),
            Duration::from_millis(10),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(token.application_key.expose_secret(), "app-key-2");
    assert!(token.client_key.is_none());
}

#[tokio::test]
async fn test_await_token_times_out() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "description": "link button not pressed" } }
        ])))
        .mount(&server)
        .await;

    let result = client
        .await_token(
            &app_id(),
            Duration::from_millis(50),
            Duration::from_millis(10),
            &CancellationToken::new(),
        )
        .await;

    assert!(
        matches!(result, Err(Error::PairingTimeout { .. })),
        "expected PairingTimeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_await_token_cancelled() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "description": "link button not pressed" } }
        ])))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client
        .await_token(
            &app_id(),
            Duration::from_secs(30),
            Duration::from_secs(5),
            &cancel,
        )
        .await;

    assert!(
        matches!(result, Err(Error::Cancelled)),
        "expected Cancelled, got: {result:?}"
    );
}

// ── Lights ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_lights() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .and(header("hue-application-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [light_json("light-1", true), {
                "id": "light-2",
                "owner": { "rid": "device-2", "rtype": "device" },
                "on": { "on": false }
            }]
        })))
        .mount(&server)
        .await;

    let lights = client.list_lights().await.unwrap();

    assert_eq!(lights.len(), 2);
    assert_eq!(lights[0].id, "light-1");
    assert_eq!(lights[0].id_v1.as_deref(), Some("/lights/3"));
    assert!(lights[0].on.on);
    assert!(lights[0].supports_color());
    assert!(!lights[1].supports_color());
    assert!(lights[1].dimming.is_none());
}

#[tokio::test]
async fn test_get_light_empty_data() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light/missing"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "errors": [], "data": [] })),
        )
        .mount(&server)
        .await;

    let light = client.get_light("missing").await.unwrap();
    assert!(light.is_none());
}

#[tokio::test]
async fn test_envelope_errors_become_bridge_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light/light-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "description": "device unreachable" }],
            "data": []
        })))
        .mount(&server)
        .await;

    let result = client.get_light("light-1").await;
    match result {
        Err(Error::Bridge { message, .. }) => assert_eq!(message, "device unreachable"),
        other => panic!("expected Bridge error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_uses_envelope_description() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{ "description": "Not Found" }],
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.get_light("gone").await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized user"))
        .mount(&server)
        .await;

    let err = client.list_lights().await.unwrap_err();
    assert!(err.is_auth_expired(), "expected auth error, got: {err:?}");
}

#[tokio::test]
async fn test_unpaired_client_fails_before_request() {
    let server = MockServer::start().await;
    let client = BridgeClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        None,
    );

    let result = client.list_lights().await;
    assert!(
        matches!(result, Err(Error::NotPaired)),
        "expected NotPaired, got: {result:?}"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_light_sends_partial_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/light-1"))
        .and(header("hue-application-key", "test-key"))
        .and(body_json(json!({
            "on": { "on": true },
            "color": { "xy": { "x": 0.5, "y": 0.25 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [{ "rid": "light-1", "rtype": "light" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = LightUpdate::new().power(true).xy(Xy { x: 0.5, y: 0.25 });
    let refs = client.update_light("light-1", &update).await.unwrap();

    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].rtype, "light");
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client.list_lights().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [{
                "id": "device-1",
                "id_v1": "/lights/3",
                "metadata": { "name": "Desk lamp", "archetype": "sultan_bulb" },
                "product_data": {
                    "model_id": "LCA001",
                    "manufacturer_name": "Signify Netherlands B.V.",
                    "product_name": "Hue color lamp"
                },
                "services": [{ "rid": "light-1", "rtype": "light" }]
            }]
        })))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].metadata.name, "Desk lamp");
    assert_eq!(devices[0].services[0].rid, "light-1");
}

#[tokio::test]
async fn test_identify_device() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/device/device-1"))
        .and(body_json(json!({ "identify": { "action": "identify" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [{ "rid": "device-1", "rtype": "device" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.identify_device("device-1").await.unwrap();
}
