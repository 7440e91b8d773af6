// ── API-to-domain type conversions ──
//
// Bridges raw `vigil_api` log records into canonical `vigil_core::model`
// events. Records missing a required field or carrying an unparseable
// timestamp are malformed: they are dropped with a log line, never
// propagated as a fatal error for the cycle.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use vigil_api::models::LogRecord;

use crate::model::Event;

/// Parse a guard-service timestamp.
///
/// The service emits ISO-8601, usually without a UTC offset
/// (`2025-06-15T10:30:00`). Try RFC 3339 first, then naive-as-UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Convert a raw log record into a domain event.
///
/// Returns `None` (after logging) for malformed records.
pub fn event_from_record(record: LogRecord) -> Option<Event> {
    let LogRecord {
        id,
        device_id,
        event_type,
        info,
        timestamp,
    } = record;

    let (Some(id), Some(device_id), Some(kind), Some(raw_ts)) =
        (id, device_id, event_type, timestamp)
    else {
        warn!("dropping malformed event record (missing required field)");
        return None;
    };

    let Some(timestamp) = parse_timestamp(&raw_ts) else {
        warn!(id, raw_ts, "dropping event record with unparseable timestamp");
        return None;
    };

    Some(Event {
        id,
        device_id,
        kind,
        info,
        timestamp,
    })
}
