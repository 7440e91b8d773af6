#![allow(clippy::unwrap_used)]
// Integration tests for `GuardClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vigil_api::{Error, GuardClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GuardClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = GuardClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn token() -> SecretString {
    SecretString::from("test-token".to_string())
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_json(json!({ "username": "alice", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc123",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_string());
    let resp = client.login("alice", &secret).await.unwrap();

    assert_eq!(resp.access_token, "abc123");
    assert_eq!(resp.token_type, "bearer");
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Incorrect username or password" })),
        )
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_string());
    let result = client.login("alice", &secret).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(
                message.contains("Incorrect"),
                "expected detail message, got: {message}"
            );
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

// ── Event log tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_logs() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/logs/"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 7,
                "device_id": 1,
                "event_type": "danger",
                "info": "motion while armed",
                "timestamp": "2025-06-15T10:30:00"
            },
            {
                "id": 8,
                "device_id": 1,
                "event_type": "pin_check",
                "info": "PIN correct: True",
                "timestamp": "2025-06-15T10:31:00"
            }
        ])))
        .mount(&server)
        .await;

    let logs = client.fetch_logs(&token()).await.unwrap();

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].id, Some(7));
    assert_eq!(logs[0].event_type.as_deref(), Some("danger"));
    assert_eq!(logs[1].id, Some(8));
}

#[tokio::test]
async fn test_fetch_logs_tolerates_partial_records() {
    let (server, client) = setup().await;

    // Record with no id and no event_type still deserializes; the core
    // decides what to drop.
    Mock::given(method("GET"))
        .and(path("/logs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "device_id": 1, "timestamp": "2025-06-15T10:30:00" }
        ])))
        .mount(&server)
        .await;

    let logs = client.fetch_logs(&token()).await.unwrap();

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, None);
    assert_eq!(logs[0].event_type, None);
}

#[tokio::test]
async fn test_fetch_logs_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/logs/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Could not validate credentials"
        })))
        .mount(&server)
        .await;

    let result = client.fetch_logs(&token()).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(result.unwrap_err().is_auth_expired());
}

// ── PIN validation tests ────────────────────────────────────────────

#[tokio::test]
async fn test_check_pin_valid() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/check_pin"))
        .and(body_json(json!({ "pin_code": "1234", "unique_key": "dev-key-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pin_valid": true })))
        .mount(&server)
        .await;

    let pin = SecretString::from("1234".to_string());
    let resp = client.check_pin(&pin, "dev-key-1").await.unwrap();

    assert!(resp.pin_valid);
}

#[tokio::test]
async fn test_check_pin_invalid_omits_field() {
    let (server, client) = setup().await;

    // Wrong PIN: the service answers with only an info string.
    Mock::given(method("POST"))
        .and(path("/devices/check_pin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "info": "PIN correct: False" })),
        )
        .mount(&server)
        .await;

    let pin = SecretString::from("0000".to_string());
    let resp = client.check_pin(&pin, "dev-key-1").await.unwrap();

    assert!(!resp.pin_valid);
    assert_eq!(resp.info.as_deref(), Some("PIN correct: False"));
}

#[tokio::test]
async fn test_disarm() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/disarm"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({ "unique_key": "dev-key-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pin_valid": true })))
        .mount(&server)
        .await;

    let resp = client.disarm(&token(), "dev-key-1").await.unwrap();

    assert!(resp.pin_valid);
}

// ── Device tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Front door", "unique_key": "dev-key-1", "active": true }
        ])))
        .mount(&server)
        .await;

    let devices = client.list_devices(&token()).await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].unique_key, "dev-key-1");
    assert!(devices[0].active);
}

#[tokio::test]
async fn test_add_device_claims_provisioned_unit() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({ "unique_key": "dev-key-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            { "id": 1, "name": "Front door", "unique_key": "dev-key-1", "active": true }
        )))
        .mount(&server)
        .await;

    let device = client.add_device(&token(), "dev-key-1").await.unwrap();

    assert_eq!(device.id, 1);
    assert_eq!(device.unique_key, "dev-key-1");
}

#[tokio::test]
async fn test_add_device_unknown_key_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Device with this unique_key does not exist. Cannot create a new device."
        })))
        .mount(&server)
        .await;

    let result = client.add_device(&token(), "no-such-key").await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("does not exist"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_change_device_password() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/change_password"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "unique_key": "dev-key-1",
            "old_password": "1111",
            "new_password": "2222"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Password changed successfully"
        })))
        .mount(&server)
        .await;

    let old = SecretString::from("1111".to_string());
    let new = SecretString::from("2222".to_string());
    let resp = client
        .change_device_password(&token(), "dev-key-1", &old, &new)
        .await
        .unwrap();

    assert_eq!(resp.status, "Password changed successfully");
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/logs/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.fetch_logs(&token()).await;

    match result {
        Err(e) => {
            assert!(e.is_transient());
            assert!(
                matches!(e, Error::Server { status: 500, .. }),
                "expected Server error, got: {e:?}"
            );
        }
        Ok(other) => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_carries_detail() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/change_pin"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Old PIN incorrect" })),
        )
        .mount(&server)
        .await;

    let old = SecretString::from("1111".to_string());
    let new = SecretString::from("2222".to_string());
    let result = client.change_pin(&token(), "dev-key-1", &old, &new).await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("Old PIN incorrect"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
