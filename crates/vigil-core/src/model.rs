// ── Event and alert domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic category assigned to an event by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Category {
    /// Routine activity; no monitoring significance.
    Benign,
    /// A successful PIN validation was recorded.
    SuccessfulCheck,
    /// Potential unauthorized access attempt.
    Danger,
}

/// Security event from the guard service event log.
///
/// Immutable once received. Ids are unique and monotonically increasing
/// per device; the session cursor compares against them to avoid
/// reprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub device_id: i64,
    /// Raw event type tag (`"danger"`, `"pin_check"`, ...).
    pub kind: String,
    pub info: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// User-facing alert produced by the alert engine.
///
/// Ephemeral: broadcast once to the notification sink, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
    pub event_id: i64,
}
