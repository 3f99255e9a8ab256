#![allow(clippy::unwrap_used)]
// Integration tests for `HueSession` against a wiremock bridge.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huecolors_core::{
    BridgeInfo, Cache, CoreError, HueConfig, HueSession, LightInfo, Resource, Rgb, Swatch,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer, photos: &std::path::Path) -> HueConfig {
    HueConfig {
        discovery_url: format!("{}/discovery", server.uri()),
        timeout: Duration::from_secs(5),
        pairing_timeout: Duration::from_millis(200),
        pairing_poll_interval: Duration::from_millis(10),
        photos_dir: photos.to_path_buf(),
        ..HueConfig::default()
    }
}

fn session(server: &MockServer) -> HueSession {
    let photos = std::env::temp_dir().join("huecolors-session-test");
    HueSession::new(config(server, &photos), Cache::open_in_memory().unwrap())
}

/// A session over an on-disk cache, standing in for one CLI invocation.
fn session_at(server: &MockServer, db: &std::path::Path) -> HueSession {
    let photos = std::env::temp_dir().join("huecolors-session-test");
    HueSession::new(config(server, &photos), Cache::open(db).unwrap())
}

/// A session whose cache already holds credentials for the mock bridge.
async fn paired_session(server: &MockServer) -> HueSession {
    let session = session(server);
    let bridge = BridgeInfo {
        app_key: "app-key".into(),
        client_key: "client-key".into(),
        ..BridgeInfo::selected(server.uri(), "bridge-1")
    };
    session.cache().insert_or_update(&bridge).unwrap();
    session.init().await.unwrap();
    session
}

fn cached_light(id: &str, is_hue: bool, power: bool) -> LightInfo {
    LightInfo {
        color: None,
        label: format!("Lamp {id}"),
        owner: format!("device-{id}"),
        is_hue,
        power,
        brightness: 50.0,
        v1_id: format!("/lights/{id}"),
        id: format!("light-{id}"),
    }
}

fn ok_envelope(rid: &str, rtype: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "errors": [],
        "data": [{ "rid": rid, "rtype": rtype }]
    }))
}

// ── Initialization ──────────────────────────────────────────────────

#[tokio::test]
async fn test_init_without_bridge() {
    let server = MockServer::start().await;
    let session = session(&server);

    let state = session.init().await.unwrap();

    assert_eq!(state.hostname, None);
    assert!(!state.authorized);
    assert!(!session.is_authorized().unwrap());
    assert_eq!(session.authorized().get(), Resource::Success(false));
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let server = MockServer::start().await;
    let session = paired_session(&server).await;

    let again = session.init().await.unwrap();

    assert!(again.authorized);
    assert_eq!(again.hostname.as_deref(), Some(server.uri().as_str()));
    assert!(matches!(session.shade().get(), Resource::Success(_)));
}

#[tokio::test]
async fn test_init_without_selection_takes_latest_bridge() {
    let server = MockServer::start().await;
    let session = session(&server);
    session
        .cache()
        .insert_or_update(&BridgeInfo::selected("10.0.0.2", "a"))
        .unwrap();
    session
        .cache()
        .insert_or_update(&BridgeInfo::selected("10.0.0.3", "b"))
        .unwrap();

    let state = session.init().await.unwrap();

    assert_eq!(state.hostname.as_deref(), Some("10.0.0.3"));
    assert!(!state.authorized);
}

#[tokio::test]
async fn test_init_remembers_reselected_bridge() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("huecolors.db");

    let first = session_at(&server, &db);
    first.init().await.unwrap();
    first.select_address("10.0.0.2").await.unwrap();
    first.select_address("10.0.0.3").await.unwrap();
    first.select_address("10.0.0.2").await.unwrap();
    drop(first);

    let next = session_at(&server, &db);
    let state = next.init().await.unwrap();

    assert_eq!(state.hostname.as_deref(), Some("10.0.0.2"));
    assert_eq!(next.selected_hostname().await.as_deref(), Some("10.0.0.2"));
}

#[tokio::test]
async fn test_selection_after_pairing_is_authorized_next() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "second-app", "clientkey": "second-client" } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("huecolors.db");

    let first = session_at(&server, &db);
    first.init().await.unwrap();
    let paired = first.select_address("10.0.0.2").await.unwrap();
    first
        .cache()
        .insert_or_update(&BridgeInfo {
            app_key: "first-app".into(),
            client_key: "first-client".into(),
            ..paired
        })
        .unwrap();
    first.select_host(&server.uri(), "bridge-2").await.unwrap();
    drop(first);

    let next = session_at(&server, &db);
    let state = next.init().await.unwrap();
    assert_eq!(state.hostname.as_deref(), Some(server.uri().as_str()));
    assert!(!state.authorized);

    let bridge = next
        .authorize_bridge(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(bridge.hostname, server.uri());
    assert_eq!(bridge.app_key, "second-app");

    let untouched = next
        .cache()
        .bridge_by_hostname("10.0.0.2")
        .unwrap()
        .unwrap();
    assert_eq!(untouched.app_key, "first-app");
}

// ── Discovery & selection ───────────────────────────────────────────

#[tokio::test]
async fn test_discover_bridges() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "001788fffe123456", "internalipaddress": "192.168.1.20", "port": 443 }
        ])))
        .mount(&server)
        .await;

    let session = session(&server);
    let bridges = session.discover_bridges().await.unwrap();

    assert_eq!(bridges.len(), 1);
    assert_eq!(session.bridges().get(), Resource::Success(bridges));
}

#[tokio::test]
async fn test_discovery_failure_sets_error_and_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let session = session(&server);
    let mut notices = session.notices();

    let result = session.discover_bridges().await;

    assert!(result.is_err());
    assert!(session.bridges().get().message().is_some());
    assert!(notices.try_recv().is_ok());
}

#[tokio::test]
async fn test_select_address_validates_input() {
    let server = MockServer::start().await;
    let session = session(&server);

    let err = session.select_address("hue-bridge.local").await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));

    let bridge = session.select_address("192.168.1.20").await.unwrap();
    assert_eq!(bridge.hostname, "192.168.1.20");
    assert_eq!(bridge.port, 443);
    assert!(bridge.app_key.is_empty());
    assert_eq!(
        session.selected_hostname().await.as_deref(),
        Some("192.168.1.20")
    );
}

// ── Authorization ───────────────────────────────────────────────────

#[tokio::test]
async fn test_authorize_stores_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_json(json!({
            "devicetype": "HueColors#cli",
            "generateclientkey": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "new-app-key", "clientkey": "new-client-key" } }
        ])))
        .mount(&server)
        .await;

    let session = session(&server);
    session.select_host(&server.uri(), "bridge-1").await.unwrap();

    let bridge = session
        .authorize_bridge(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(bridge.app_key, "new-app-key");
    assert_eq!(bridge.client_key, "new-client-key");
    assert!(session.is_authorized().unwrap());
    assert_eq!(session.authorized().get(), Resource::Success(true));

    let stored = session.cache().bridge_with_credentials().unwrap().unwrap();
    assert_eq!(stored.hostname, server.uri());
    assert_eq!(stored.id, bridge.id);
}

#[tokio::test]
async fn test_authorize_without_client_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "legacy-app-key" } }
        ])))
        .mount(&server)
        .await;

    let session = session(&server);
    session.select_host(&server.uri(), "bridge-1").await.unwrap();

    let bridge = session
        .authorize_bridge(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(bridge.client_key, "");
    assert!(bridge.has_credentials());
    assert!(session.is_authorized().unwrap());

    let stored = session.cache().bridge_with_credentials().unwrap().unwrap();
    assert_eq!(stored.app_key, "legacy-app-key");
}

#[tokio::test]
async fn test_authorize_times_out_without_button() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "description": "link button not pressed" } }
        ])))
        .mount(&server)
        .await;

    let session = session(&server);
    session.select_host(&server.uri(), "bridge-1").await.unwrap();

    let err = session
        .authorize_bridge(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PairingTimeout { .. }));
    assert!(session.authorized().get().message().is_some());
    assert!(!session.is_authorized().unwrap());
}

#[tokio::test]
async fn test_authorize_without_selection() {
    let server = MockServer::start().await;
    let session = session(&server);

    let err = session
        .authorize_bridge(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NoBridgeSelected));
}

// ── Lights ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_load_lists_from_bridge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .and(header("hue-application-key", "app-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [
                {
                    "id": "light-1",
                    "id_v1": "/lights/1",
                    "owner": { "rid": "device-1", "rtype": "device" },
                    "on": { "on": true },
                    "dimming": { "brightness": 80.0 },
                    "color": { "xy": { "x": 0.64, "y": 0.33 } }
                },
                {
                    "id": "light-2",
                    "id_v1": "/lights/2",
                    "owner": { "rid": "device-2", "rtype": "device" },
                    "on": { "on": false }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = paired_session(&server).await;
    let mut notices = session.notices();

    let lights = session.load_lights().await.unwrap();

    assert_eq!(lights.len(), 2);
    assert_eq!(lights[0].label, "Lamp 1");
    assert!(lights[0].is_hue);
    assert!(!lights[1].is_hue);
    assert_eq!(session.cache().lights().unwrap(), lights);
    assert_eq!(session.lights().get(), Resource::Success(lights));
    assert_eq!(notices.try_recv().unwrap(), "Loaded lights");
}

#[tokio::test]
async fn test_reload_refreshes_each_cached_light() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light/light-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [{
                "id": "light-1",
                "id_v1": "/lights/1",
                "owner": { "rid": "device-1", "rtype": "device" },
                "on": { "on": true },
                "color": { "xy": { "x": 0.15, "y": 0.06 } }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light/light-2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{ "description": "Not Found" }],
            "data": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = paired_session(&server).await;
    let mut stale = cached_light("1", true, false);
    stale.label = "Desk".into();
    session
        .cache()
        .insert_or_update_lights(&[stale, cached_light("2", true, true)])
        .unwrap();

    session.load_lights().await.unwrap();

    let desk = session.cache().light("light-1").unwrap().unwrap();
    assert!(desk.power);
    assert_eq!(desk.label, "Desk");
    let (r, g, b) = desk.color.unwrap().components();
    assert!(b > r && b > g, "expected blue, got ({r}, {g}, {b})");

    let gone = session.cache().light("light-2").unwrap().unwrap();
    assert!(!gone.power);
    assert_eq!(gone.color, None);
}

#[tokio::test]
async fn test_load_without_authorization_fails() {
    let server = MockServer::start().await;
    let session = session(&server);
    session.init().await.unwrap();
    let mut notices = session.notices();

    let err = session.load_lights().await.unwrap_err();

    assert!(matches!(err, CoreError::NotAuthorized));
    assert!(matches!(session.lights().get(), Resource::Error { .. }));
    assert!(notices.try_recv().is_ok());
}

#[tokio::test]
async fn test_toggle_updates_bridge_then_cache() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/light-1"))
        .and(body_json(json!({ "on": { "on": false } })))
        .respond_with(ok_envelope("light-1", "light"))
        .expect(1)
        .mount(&server)
        .await;

    let session = paired_session(&server).await;
    session
        .cache()
        .insert_or_update_light(&cached_light("1", true, true))
        .unwrap();

    let light = session.toggle_light("light-1", false).await.unwrap().unwrap();

    assert!(!light.power);
    assert!(!session.cache().light("light-1").unwrap().unwrap().power);
}

#[tokio::test]
async fn test_brightness_skips_bridge_when_off() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ok_envelope("light-1", "light"))
        .expect(0)
        .mount(&server)
        .await;

    let session = paired_session(&server).await;
    session
        .cache()
        .insert_or_update_light(&cached_light("1", true, false))
        .unwrap();

    let light = session.set_brightness("light-1", 150.0).await.unwrap();

    assert!((light.brightness - 100.0).abs() < f32::EPSILON);
    let stored = session.cache().light("light-1").unwrap().unwrap();
    assert!((stored.brightness - 100.0).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_brightness_sent_when_on() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/light-1"))
        .and(body_json(json!({ "dimming": { "brightness": 40.0 } })))
        .respond_with(ok_envelope("light-1", "light"))
        .expect(1)
        .mount(&server)
        .await;

    let session = paired_session(&server).await;
    session
        .cache()
        .insert_or_update_light(&cached_light("1", true, true))
        .unwrap();

    let light = session.set_brightness("light-1", 40.0).await.unwrap();
    assert!((light.brightness - 40.0).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_brightness_for_unknown_light() {
    let server = MockServer::start().await;
    let session = paired_session(&server).await;

    let err = session.set_brightness("nope", 50.0).await.unwrap_err();
    assert!(matches!(err, CoreError::LightNotFound { .. }));
}

#[tokio::test]
async fn test_identify_matches_owner_device() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [
                { "id": "bridge-device", "metadata": { "name": "Bridge" } },
                { "id": "device-1", "id_v1": "/lights/1", "metadata": { "name": "Desk" } }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/device/device-1"))
        .and(body_json(json!({ "identify": { "action": "identify" } })))
        .respond_with(ok_envelope("device-1", "device"))
        .expect(1)
        .mount(&server)
        .await;

    let session = paired_session(&server).await;
    session
        .cache()
        .insert_or_update_light(&cached_light("1", true, true))
        .unwrap();

    session.identify_light("/lights/1").await.unwrap();
}

#[tokio::test]
async fn test_grouped_devices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [{ "id": "device-1", "metadata": { "name": "Desk" } }]
        })))
        .mount(&server)
        .await;

    let session = paired_session(&server).await;
    let devices = session.grouped_devices().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert!(matches!(session.devices().get(), Resource::Success(ref d) if d.len() == 1));
}

// ── Palette ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_apply_palette_round_robin_continues_past_failures() {
    let server = MockServer::start().await;
    for id in ["light-1", "light-3"] {
        Mock::given(method("PUT"))
            .and(path(format!("/clip/v2/resource/light/{id}")))
            .respond_with(ok_envelope(id, "light"))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/light-2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/light-4"))
        .respond_with(ok_envelope("light-4", "light"))
        .expect(0)
        .mount(&server)
        .await;

    let session = paired_session(&server).await;
    session
        .cache()
        .insert_or_update_lights(&[
            cached_light("1", true, false),
            cached_light("2", true, false),
            cached_light("3", true, false),
            cached_light("4", false, false),
        ])
        .unwrap();
    let mut notices = session.notices();

    let red = Rgb::new(255, 0, 0);
    let green = Rgb::new(0, 255, 0);
    let swatches = [
        Swatch {
            color: red,
            population: 10,
        },
        Swatch {
            color: green,
            population: 5,
        },
    ];

    let outcome = session.apply_palette(&swatches).await.unwrap();

    assert_eq!(outcome.swatches, 2);
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.failed, 1);

    let first = session.cache().light("light-1").unwrap().unwrap();
    assert_eq!(first.color, Some(red));
    assert!(first.power);

    let failed = session.cache().light("light-2").unwrap().unwrap();
    assert_eq!(failed.color, None);
    assert!(!failed.power);

    let third = session.cache().light("light-3").unwrap().unwrap();
    assert_eq!(third.color, Some(red));

    assert_eq!(notices.try_recv().unwrap(), "Applied 2 swatches");
}

// ── Photos ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_images_cell_tracks_library() {
    let server = MockServer::start().await;
    let photos = tempfile::tempdir().unwrap();
    let session = HueSession::new(
        config(&server, photos.path()),
        Cache::open_in_memory().unwrap(),
    );

    let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        4,
        4,
        image::Rgb([10, 20, 30]),
    ));
    let saved = session.save_photo(&image).unwrap();

    let images = session.load_images().unwrap();
    assert_eq!(images, vec![saved]);
    assert!(matches!(session.images().get(), Resource::Success(_)));

    session.clear_images();
    assert_eq!(session.images().get(), Resource::Empty);
}

#[tokio::test]
async fn test_palette_from_file_honors_override() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("split.png");
    let mut image = image::RgbImage::from_pixel(32, 32, image::Rgb([200, 30, 30]));
    for x in 0..16 {
        for y in 0..32 {
            image.put_pixel(x, y, image::Rgb([30, 30, 200]));
        }
    }
    image.save(&path).unwrap();

    let session = session(&server);

    let two = session.palette_from_file(&path, Some(2)).unwrap();
    assert!(!two.is_empty() && two.len() <= 2);

    let missing = session.palette_from_file(&dir.path().join("nope.png"), None);
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_clear_lights_empties_cache_and_cell() {
    let server = MockServer::start().await;
    let session = paired_session(&server).await;
    session
        .cache()
        .insert_or_update_lights(&[cached_light("1", true, true), cached_light("2", false, true)])
        .unwrap();
    session.lights().succeed(session.cache().lights().unwrap());

    assert_eq!(session.clear_lights().unwrap(), 2);
    assert!(session.cache().lights().unwrap().is_empty());
    assert_eq!(session.lights().get(), Resource::Empty);
}
