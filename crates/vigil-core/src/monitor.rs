// ── Monitor abstraction ──
//
// Full lifecycle management for the background monitoring loop.
// Owns the polling cadence, session/token lifecycle, event
// classification, deduplicated alerting, and the disarm workflow.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use vigil_api::GuardClient;
use vigil_api::transport::TransportConfig;

use crate::classify::classify;
use crate::config::MonitorConfig;
use crate::convert::event_from_record;
use crate::engine::AlertEngine;
use crate::error::CoreError;
use crate::model::{Alert, Category, Event};
use crate::session::SessionStore;

const ALERT_CHANNEL_SIZE: usize = 64;
const EVENT_CHANNEL_SIZE: usize = 256;

// ── MonitorState ─────────────────────────────────────────────────

/// Monitoring loop state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Created, never started.
    Idle,
    /// Poll loop running.
    Monitoring,
    /// Session absent or token rejected -- the host must re-login.
    /// Emitted once per occurrence; the loop has stopped.
    NeedsAuthentication,
    /// Explicitly stopped by the host.
    Stopped,
}

// ── Monitor ──────────────────────────────────────────────────────

/// The main entry point for host environments.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. Manages the polling
/// lifecycle and exposes reactive outputs: a state watch channel,
/// an alert broadcast, and per-cycle event history batches. The host
/// binds these to its native notification mechanism.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    sessions: Arc<SessionStore>,
    client: GuardClient,
    /// Updated only after a fetch completes, under the same
    /// serialization discipline as the session store.
    engine: Mutex<AlertEngine>,
    state: watch::Sender<MonitorState>,
    alert_tx: broadcast::Sender<Alert>,
    event_tx: broadcast::Sender<Arc<Vec<Event>>>,
    cancel: CancellationToken,
    /// Child token for the current run -- cancelled on stop, replaced
    /// on the next start (avoids permanent cancellation).
    poll_cancel: Mutex<CancellationToken>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

/// What a completed poll cycle means for the loop.
enum CycleOutcome {
    /// Schedule the next tick.
    Continue,
    /// Tear the loop down (session invalid or cancelled).
    Stop,
}

impl Monitor {
    /// Create a new Monitor. Does NOT poll -- call [`start()`](Self::start)
    /// (or [`login()`](Self::login)) to begin the monitoring loop.
    pub fn new(config: MonitorConfig, sessions: Arc<SessionStore>) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            danger_accept_invalid_certs: config.danger_accept_invalid_certs,
        };
        let client = GuardClient::new(config.url.clone(), &transport)?;

        let (state, _) = watch::channel(MonitorState::Idle);
        let (alert_tx, _) = broadcast::channel(ALERT_CHANNEL_SIZE);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let poll_cancel = cancel.child_token();

        Ok(Self {
            inner: Arc::new(MonitorInner {
                config,
                sessions,
                client,
                engine: Mutex::new(AlertEngine::new()),
                state,
                alert_tx,
                event_tx,
                cancel,
                poll_cancel: Mutex::new(poll_cancel),
                task_handle: Mutex::new(None),
            }),
        })
    }

    /// Access the monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Access the underlying session store.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.inner.sessions
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to monitoring state changes.
    pub fn state(&self) -> watch::Receiver<MonitorState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to the alert broadcast (the notification sink input).
    pub fn alerts(&self) -> broadcast::Receiver<Alert> {
        self.inner.alert_tx.subscribe()
    }

    /// Subscribe to per-cycle event history batches (informational,
    /// for list rendering).
    pub fn events(&self) -> broadcast::Receiver<Arc<Vec<Event>>> {
        self.inner.event_tx.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start the polling loop. The first cycle fires after one full
    /// interval, not immediately. A no-op when already running.
    pub async fn start(&self) {
        let mut handle = self.inner.task_handle.lock().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let cancel = self.inner.cancel.child_token();
        *self.inner.poll_cancel.lock().await = cancel.clone();
        self.set_state(MonitorState::Monitoring);

        let monitor = self.clone();
        let interval = self.inner.config.poll_interval;
        *handle = Some(tokio::spawn(poll_task(monitor, interval, cancel)));
        info!(interval_secs = interval.as_secs(), "monitoring started");
    }

    /// Stop the polling loop, cancelling any in-flight fetch. A cancelled
    /// cycle never advances the cursor or raises alerts.
    ///
    /// Only an actively `Monitoring` loop transitions to `Stopped`: a
    /// loop that already ended on `NeedsAuthentication` keeps that state
    /// visible to late subscribers.
    pub async fn stop(&self) {
        self.inner.poll_cancel.lock().await.cancel();

        if let Some(handle) = self.inner.task_handle.lock().await.take() {
            let _ = handle.await;
        }

        self.inner.state.send_if_modified(|current| {
            if *current == MonitorState::Monitoring {
                *current = MonitorState::Stopped;
                true
            } else {
                false
            }
        });
        debug!("monitoring stopped");
    }

    // ── Host inputs ──────────────────────────────────────────────

    /// Install a fresh session after the host's login flow succeeded,
    /// rearm the engine, and (re)start polling.
    ///
    /// The persisted cursor is kept for the same device, so events seen
    /// before the re-login are not replayed.
    pub async fn login(&self, device_key: &str, token: &SecretString) {
        self.inner.sessions.set(device_key, token);
        self.inner.engine.lock().await.reset();
        self.start().await;
    }

    /// Forget the session and stop polling.
    pub async fn logout(&self) {
        self.stop().await;
        self.inner.sessions.clear();
    }

    /// Validate a PIN against the guard service and feed the result to
    /// the alert engine. Returns whether the PIN was accepted.
    pub async fn disarm(&self, pin: &SecretString) -> Result<bool, CoreError> {
        let session = self.inner.sessions.get().ok_or(CoreError::NotLoggedIn)?;
        let resp = self.inner.client.check_pin(pin, &session.device_key).await?;

        self.apply_disarm_result(resp.pin_valid).await;
        Ok(resp.pin_valid)
    }

    /// Feed an externally obtained disarm result to the alert engine
    /// (for hosts that run the PIN exchange themselves).
    pub async fn apply_disarm_result(&self, valid: bool) {
        self.inner.engine.lock().await.apply_disarm(valid);
        if valid {
            info!("device disarmed; rearmed for future danger events");
        }
    }

    // ── Poll cycle ───────────────────────────────────────────────

    /// Run one poll cycle: load the session, fetch, classify, feed the
    /// engine, advance the cursor, and emit outputs.
    async fn poll_cycle(&self, cancel: &CancellationToken) -> CycleOutcome {
        let Some(session) = self.inner.sessions.get() else {
            info!("no active session; monitoring halts until login");
            self.set_state(MonitorState::NeedsAuthentication);
            return CycleOutcome::Stop;
        };

        // The fetch is the cancellation point: a cancelled cycle must
        // not touch the engine or the cursor.
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => return CycleOutcome::Stop,
            res = self.inner.client.fetch_logs(&session.token) => res,
        };

        let records = match fetched {
            Ok(records) => records,
            Err(e) if e.is_auth_expired() => {
                warn!(error = %e, "token rejected; clearing session");
                self.inner.sessions.clear();
                self.set_state(MonitorState::NeedsAuthentication);
                return CycleOutcome::Stop;
            }
            Err(e) => {
                // Transient by policy: the next scheduled tick retries.
                warn!(error = %CoreError::from(e), "poll cycle failed; retrying next tick");
                return CycleOutcome::Continue;
            }
        };

        // A login may have replaced the session while the fetch was in
        // flight. A stale batch must not feed the engine or stamp the
        // replacement session's cursor.
        let still_current = self
            .inner
            .sessions
            .get()
            .is_some_and(|current| current.device_key == session.device_key);
        if !still_current {
            debug!("session replaced mid-fetch; discarding cycle");
            return CycleOutcome::Continue;
        }

        // Malformed records are dropped (and logged) individually.
        let cursor = session.last_event_cursor;
        let fresh: Vec<Event> = records
            .into_iter()
            .filter_map(event_from_record)
            .filter(|event| cursor.is_none_or(|seen| event.id > seen))
            .collect();

        if fresh.is_empty() {
            debug!("poll cycle complete; no new events");
            return CycleOutcome::Continue;
        }

        let classified: Vec<(Event, Category)> = fresh
            .iter()
            .map(|event| (event.clone(), classify(event)))
            .collect();

        let alert = self.inner.engine.lock().await.observe(&classified);

        // Fetch completed uncancelled: the cursor may advance, scoped to
        // the device this cycle fetched for.
        if let Some(newest) = fresh.iter().map(|event| event.id).max() {
            self.inner.sessions.advance_cursor(&session.device_key, newest);
        }

        if let Some(alert) = alert {
            info!(event_id = alert.event_id, "raising alert");
            let _ = self.inner.alert_tx.send(alert);
        }

        debug!(count = fresh.len(), "poll cycle complete");
        let _ = self.inner.event_tx.send(Arc::new(fresh));

        CycleOutcome::Continue
    }

    /// Publish a state transition, suppressing no-op repeats so signals
    /// like `NeedsAuthentication` fire exactly once per occurrence.
    fn set_state(&self, next: MonitorState) {
        self.inner.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

// ── Background task ──────────────────────────────────────────────

/// Timer-driven polling loop. One cycle fully completes (or fails)
/// before the next tick is scheduled -- never two fetches in flight
/// against the same cursor.
async fn poll_task(monitor: Monitor, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if matches!(monitor.poll_cycle(&cancel).await, CycleOutcome::Stop) {
                    break;
                }
            }
        }
    }

    debug!("monitoring loop ended");
}
