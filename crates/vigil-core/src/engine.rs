// ── Alert deduplication & state engine ──
//
// Per-device state machine deciding, for each poll cycle, whether to
// raise a new alert, suppress a repeat, or clear state after a disarm.
// Pure and total over well-formed input: no I/O, no failure modes.

use tracing::debug;

use crate::model::{Alert, Category, Event};

/// Arm state of the monitored device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    /// Ready to alert on the next new danger event.
    Armed,
    /// An alert has fired for the most recent danger event and is
    /// pending acknowledgment via disarm.
    Alerted,
    /// Alarm silenced by a valid disarm while no intrusion was pending.
    /// A new danger event rearms implicitly (and alerts).
    Disarmed,
}

/// Tracks which events have already produced a user alert and decides
/// what each classified batch yields.
///
/// Invariant: `last_alerted_event_id` strictly increases with each
/// raised alert -- no two alerts for the same event id, ever.
#[derive(Debug)]
pub struct AlertEngine {
    state: ArmState,
    last_alerted_event_id: Option<i64>,
}

impl AlertEngine {
    /// Starts `Armed` with no alert history, matching service start.
    pub fn new() -> Self {
        Self {
            state: ArmState::Armed,
            last_alerted_event_id: None,
        }
    }

    pub fn state(&self) -> ArmState {
        self.state
    }

    pub fn last_alerted_event_id(&self) -> Option<i64> {
        self.last_alerted_event_id
    }

    /// Reset to `Armed` on login / new session.
    ///
    /// Alert history is cleared; the session cursor is what prevents
    /// already-seen events from being replayed into the engine.
    pub fn reset(&mut self) {
        self.state = ArmState::Armed;
        self.last_alerted_event_id = None;
    }

    /// Feed one poll cycle's classified batch through the state machine.
    ///
    /// At most one alert is produced per cycle: when the batch holds
    /// several qualifying danger events, only the highest id alerts
    /// (avoiding a notification storm), and `last_alerted_event_id`
    /// advances to that id. Danger events at or below the watermark are
    /// duplicates from overlapping fetch windows and are ignored.
    pub fn observe(&mut self, batch: &[(Event, Category)]) -> Option<Alert> {
        let newest_danger = batch
            .iter()
            .filter(|(event, category)| {
                *category == Category::Danger
                    && self.last_alerted_event_id.is_none_or(|last| event.id > last)
            })
            .max_by_key(|(event, _)| event.id);

        let (event, _) = newest_danger?;

        debug!(event_id = event.id, prior_state = ?self.state, "raising alert");
        self.last_alerted_event_id = Some(event.id);
        self.state = ArmState::Alerted;

        Some(build_alert(event))
    }

    /// Apply the outcome of a disarm / PIN-validation exchange.
    ///
    /// A valid disarm acknowledges the pending intrusion (`Alerted` →
    /// `Armed`) -- it must not suppress a future one. Disarming while
    /// already `Armed` silences the alarm until the next danger event.
    /// An invalid PIN changes nothing.
    pub fn apply_disarm(&mut self, valid: bool) {
        if !valid {
            return;
        }

        self.state = match self.state {
            ArmState::Alerted => ArmState::Armed,
            ArmState::Armed | ArmState::Disarmed => ArmState::Disarmed,
        };
        debug!(state = ?self.state, "disarm applied");
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the user-facing alert for a danger event.
fn build_alert(event: &Event) -> Alert {
    let body = match event.info.as_deref() {
        Some(info) if !info.is_empty() => format!("Unauthorized access attempt detected: {info}"),
        _ => "Unauthorized access attempt detected".to_string(),
    };

    Alert {
        title: "Security alert".into(),
        body,
        event_id: event.id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::classify::classify;

    fn danger(id: i64) -> (Event, Category) {
        classified(id, "danger")
    }

    fn pin_check(id: i64) -> (Event, Category) {
        classified(id, "pin_check")
    }

    fn classified(id: i64, kind: &str) -> (Event, Category) {
        let event = Event {
            id,
            device_id: 1,
            kind: kind.into(),
            info: None,
            timestamp: Utc::now(),
        };
        let category = classify(&event);
        (event, category)
    }

    #[test]
    fn first_danger_event_alerts_and_moves_to_alerted() {
        let mut engine = AlertEngine::new();

        let alert = engine.observe(&[danger(2)]).expect("alert");

        assert_eq!(alert.event_id, 2);
        assert_eq!(engine.state(), ArmState::Alerted);
        assert_eq!(engine.last_alerted_event_id(), Some(2));
    }

    #[test]
    fn exactly_one_alert_per_distinct_id() {
        let mut engine = AlertEngine::new();
        let mut alerts = 0;

        for id in 1..=5 {
            if engine.observe(&[danger(id)]).is_some() {
                alerts += 1;
            }
        }

        assert_eq!(alerts, 5);
        assert_eq!(engine.last_alerted_event_id(), Some(5));
    }

    #[test]
    fn redelivered_batch_is_idempotent() {
        let mut engine = AlertEngine::new();
        let batch = [danger(2), danger(3)];

        assert!(engine.observe(&batch).is_some());
        assert!(engine.observe(&batch).is_none());
        assert_eq!(engine.last_alerted_event_id(), Some(3));
    }

    #[test]
    fn batch_with_multiple_dangers_alerts_once_for_highest_id() {
        let mut engine = AlertEngine::new();

        let alert = engine
            .observe(&[danger(4), danger(7), danger(5)])
            .expect("alert");

        assert_eq!(alert.event_id, 7);
        assert_eq!(engine.last_alerted_event_id(), Some(7));
    }

    #[test]
    fn stale_out_of_order_danger_is_suppressed() {
        let mut engine = AlertEngine::new();

        assert!(engine.observe(&[danger(10)]).is_some());
        assert!(engine.observe(&[danger(8)]).is_none());
        assert_eq!(engine.last_alerted_event_id(), Some(10));
    }

    #[test]
    fn pin_check_and_refetched_danger_yield_one_alert() {
        // Overlapping fetch windows redeliver the danger record.
        let mut engine = AlertEngine::new();

        let first = engine.observe(&[pin_check(1), danger(2)]);
        let refetched = engine.observe(&[danger(2)]);

        assert_eq!(first.expect("alert").event_id, 2);
        assert!(refetched.is_none());
    }

    #[test]
    fn successful_check_does_not_change_state() {
        let mut engine = AlertEngine::new();

        assert!(engine.observe(&[pin_check(1)]).is_none());
        assert_eq!(engine.state(), ArmState::Armed);
        assert_eq!(engine.last_alerted_event_id(), None);
    }

    #[test]
    fn disarm_rearms_for_the_next_distinct_danger() {
        let mut engine = AlertEngine::new();

        assert!(engine.observe(&[danger(2)]).is_some());
        engine.apply_disarm(true);
        assert_eq!(engine.state(), ArmState::Armed);

        // Acknowledged intrusion stays acknowledged...
        assert!(engine.observe(&[danger(2)]).is_none());
        // ...but a new one still alerts exactly once.
        let alert = engine.observe(&[danger(3)]).expect("alert");
        assert_eq!(alert.event_id, 3);
    }

    #[test]
    fn invalid_pin_changes_nothing() {
        let mut engine = AlertEngine::new();

        assert!(engine.observe(&[danger(2)]).is_some());
        engine.apply_disarm(false);

        assert_eq!(engine.state(), ArmState::Alerted);
    }

    #[test]
    fn disarm_while_armed_silences_until_next_danger() {
        let mut engine = AlertEngine::new();

        engine.apply_disarm(true);
        assert_eq!(engine.state(), ArmState::Disarmed);

        // A new danger event rearms implicitly and still alerts.
        let alert = engine.observe(&[danger(1)]).expect("alert");
        assert_eq!(alert.event_id, 1);
        assert_eq!(engine.state(), ArmState::Alerted);
    }

    #[test]
    fn reset_returns_to_armed() {
        let mut engine = AlertEngine::new();

        assert!(engine.observe(&[danger(2)]).is_some());
        engine.reset();

        assert_eq!(engine.state(), ArmState::Armed);
        assert_eq!(engine.last_alerted_event_id(), None);
    }

    #[test]
    fn alert_body_carries_event_info() {
        let mut engine = AlertEngine::new();
        let mut event = Event {
            id: 2,
            device_id: 1,
            kind: "danger".into(),
            info: Some("motion while armed".into()),
            timestamp: Utc::now(),
        };
        let category = classify(&event);

        let alert = engine
            .observe(&[(event.clone(), category)])
            .expect("alert");
        assert!(alert.body.contains("motion while armed"));

        // Without info the body is the generic message.
        event.id = 3;
        event.info = None;
        let alert = engine.observe(&[(event, category)]).expect("alert");
        assert_eq!(alert.body, "Unauthorized access attempt detected");
    }
}
