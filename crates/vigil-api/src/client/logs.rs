// Guard service event log endpoints
//
// Recent danger events for the monitoring loop, plus the per-device
// pin-check/danger history backing event-list views.

use secrecy::SecretString;
use tracing::debug;

use crate::client::GuardClient;
use crate::error::Error;
use crate::models::LogRecord;

impl GuardClient {
    /// Fetch recent security events for the authenticated account's devices.
    ///
    /// `GET /logs/` — records arrive in ascending id order. A 401 here is
    /// the signal that the session token is no longer valid.
    pub async fn fetch_logs(&self, token: &SecretString) -> Result<Vec<LogRecord>, Error> {
        let url = self.api_url("logs/")?;
        debug!("fetching event log");
        self.get(url, Some(token)).await
    }

    /// Fetch the pin-check/danger history for a single device.
    ///
    /// `GET /devices/{unique_key}/pin_checks/`
    pub async fn list_pin_checks(&self, unique_key: &str) -> Result<Vec<LogRecord>, Error> {
        let url = self.api_url(&format!("devices/{unique_key}/pin_checks/"))?;
        debug!(unique_key, "fetching pin-check history");
        self.get(url, None).await
    }
}
