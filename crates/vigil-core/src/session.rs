// ── Session store ──
//
// Process-wide holder for the current bearer token, device key, and
// last-seen-event cursor. Durable: mutations are written through to a
// small TOML file so the cursor survives process restarts (avoiding
// alert replay storms). Access is serialized behind a mutex because
// login (host thread) and cursor advance (poller) can race.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The active session: no token means "not logged in" and the poller halts.
#[derive(Debug, Clone)]
pub struct Session {
    pub device_key: String,
    pub token: SecretString,
    pub last_event_cursor: Option<i64>,
}

/// On-disk shape of the session record.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    device_key: String,
    token: String,
    last_event_cursor: Option<i64>,
}

/// Durable key-value store for the single active session.
///
/// Pure map semantics -- no failure modes surface to callers; persistence
/// problems are logged and the in-memory state stays authoritative.
pub struct SessionStore {
    inner: Mutex<Option<SessionRecord>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Open a store backed by the given file, loading any persisted
    /// session. A missing or unreadable file starts the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = load_record(&path);
        Self {
            inner: Mutex::new(record),
            path: Some(path),
        }
    }

    /// A purely in-memory store (tests, hosts with their own persistence).
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(None),
            path: None,
        }
    }

    /// Conventional per-user session file location.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "vigil").map(|dirs| dirs.data_dir().join("session.toml"))
    }

    /// The current session, if logged in.
    pub fn get(&self) -> Option<Session> {
        let guard = self.lock();
        guard.as_ref().map(|record| Session {
            device_key: record.device_key.clone(),
            token: SecretString::from(record.token.clone()),
            last_event_cursor: record.last_event_cursor,
        })
    }

    /// Install a session after a successful login.
    ///
    /// The cursor is kept when the device key is unchanged (re-login to
    /// the same device must not replay already-seen events) and cleared
    /// when switching devices.
    pub fn set(&self, device_key: &str, token: &SecretString) {
        let mut guard = self.lock();
        let cursor = guard
            .as_ref()
            .filter(|record| record.device_key == device_key)
            .and_then(|record| record.last_event_cursor);

        *guard = Some(SessionRecord {
            device_key: device_key.to_owned(),
            token: token.expose_secret().to_owned(),
            last_event_cursor: cursor,
        });
        self.persist(&guard);
        debug!(device_key, "session installed");
    }

    /// Forget the session (logout, or token rejected by the service).
    pub fn clear(&self) {
        let mut guard = self.lock();
        *guard = None;
        self.persist(&guard);
        debug!("session cleared");
    }

    /// Move the cursor forward for the named device. A no-op when not
    /// logged in, when `device_key` no longer matches the stored session
    /// (a login to another device raced the caller), or when the supplied
    /// id is not greater than the stored cursor -- the cursor never moves
    /// backward regardless of call order.
    pub fn advance_cursor(&self, device_key: &str, event_id: i64) {
        let mut guard = self.lock();
        let Some(record) = guard.as_mut() else {
            return;
        };
        if record.device_key != device_key {
            debug!(device_key, "ignoring cursor advance for a replaced session");
            return;
        }
        if record.last_event_cursor.is_some_and(|cursor| event_id <= cursor) {
            return;
        }
        record.last_event_cursor = Some(event_id);
        self.persist(&guard);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionRecord>> {
        // Lock poisoning only happens if a writer panicked; the record
        // itself is always left consistent, so keep going.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Write-through persistence. Failures are logged, never surfaced.
    fn persist(&self, record: &Option<SessionRecord>) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Err(e) = write_record(path, record.as_ref()) {
            warn!(error = %e, path = %path.display(), "failed to persist session");
        }
    }
}

fn load_record(path: &Path) -> Option<SessionRecord> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "failed to read session file");
            return None;
        }
    };

    match toml::from_str(&raw) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "ignoring corrupt session file");
            None
        }
    }
}

fn write_record(path: &Path, record: Option<&SessionRecord>) -> std::io::Result<()> {
    let Some(record) = record else {
        return match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        };
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = toml::to_string_pretty(record).map_err(std::io::Error::other)?;
    std::fs::write(path, raw)
}
