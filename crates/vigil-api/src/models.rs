// Guard service request/response types
//
// The service speaks plain JSON (no envelope). Response fields use
// `#[serde(default)]` liberally because log records can arrive with
// missing fields — the core drops incomplete records individually
// instead of failing the whole batch.

use serde::{Deserialize, Serialize};

// ── Authentication ───────────────────────────────────────────────────

/// `POST /token` request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Bearer token issued by `POST /token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// `POST /users/` request body (account registration).
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Registered account from `POST /users/`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Registered security unit from `GET /devices/` or `POST /devices/`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    pub id: i64,
    pub name: String,
    pub unique_key: String,
    #[serde(default)]
    pub active: bool,
}

/// `POST /devices/` request body (claim a provisioned device).
#[derive(Debug, Serialize)]
pub struct AddDeviceRequest<'a> {
    pub unique_key: &'a str,
}

/// `POST /devices/change_password` request body.
#[derive(Debug, Serialize)]
pub struct PasswordChangeRequest<'a> {
    pub unique_key: &'a str,
    pub old_password: &'a str,
    pub new_password: &'a str,
}

// ── PIN validation / disarm ──────────────────────────────────────────

/// `POST /devices/check_pin` request body.
#[derive(Debug, Serialize)]
pub struct PinCheckRequest<'a> {
    pub pin_code: &'a str,
    pub unique_key: &'a str,
}

/// Result of a PIN validation or disarm exchange.
///
/// The service omits `pin_valid` entirely when the PIN is wrong
/// (it returns only an `info` string), so the field defaults to `false`.
#[derive(Debug, Clone, Deserialize)]
pub struct PinCheckResponse {
    #[serde(default)]
    pub pin_valid: bool,
    #[serde(default)]
    pub info: Option<String>,
}

/// `POST /devices/disarm` request body.
#[derive(Debug, Serialize)]
pub struct DisarmRequest<'a> {
    pub unique_key: &'a str,
}

/// `POST /devices/change_pin` request body.
#[derive(Debug, Serialize)]
pub struct PinChangeRequest<'a> {
    pub unique_key: &'a str,
    pub old_pin: &'a str,
    pub new_pin: &'a str,
}

/// Generic `{"status": "..."}` acknowledgment.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
}

// ── Event log ────────────────────────────────────────────────────────

/// Raw event record from `GET /logs/` or the pin-check history endpoint.
///
/// All fields are optional on the wire: a record missing `id`,
/// `device_id`, `event_type`, or a parseable `timestamp` is malformed
/// and gets dropped (with a log line) during domain conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub device_id: Option<i64>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    /// ISO-8601, possibly without a UTC offset.
    #[serde(default)]
    pub timestamp: Option<String>,
}
