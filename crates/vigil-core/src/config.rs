// ── Runtime monitoring configuration ──
//
// Describes *how* to reach the guard service and how often to poll.
// The host constructs a `MonitorConfig` and hands it in -- core never
// reads config files (the session store owns the only durable state).

use std::time::Duration;

use url::Url;

/// Configuration for a single monitoring agent.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Guard service base URL (e.g., `https://guard.local:8000`).
    pub url: Url,
    /// Delay between poll cycles. The first cycle fires after one full
    /// interval, not immediately.
    pub poll_interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Accept self-signed TLS certificates (self-hosted services).
    pub danger_accept_invalid_certs: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://127.0.0.1:8000").expect("valid default URL"),
            poll_interval: Duration::from_secs(60),
            timeout: Duration::from_secs(30),
            danger_accept_invalid_certs: false,
        }
    }
}
