// ── Core error types ──
//
// User-facing errors from vigil-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<vigil_api::Error>` impl translates transport-layer errors
// into the monitoring loop's taxonomy: authentication failures are fatal
// to the session, network/server failures are transient and retried.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not logged in -- no active session")]
    NotLoggedIn,

    // ── Transient errors (retried by the next poll cycle) ────────────
    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("Guard service error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Request rejected by guard service: {message}")]
    Rejected { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the error is absorbed by the poller and retried
    /// on the next scheduled tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Server { .. })
    }

    /// Returns `true` if the error invalidates the current session and
    /// must surface as a needs-authentication signal.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. } | Self::NotLoggedIn)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vigil_api::Error> for CoreError {
    fn from(err: vigil_api::Error) -> Self {
        match err {
            vigil_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            vigil_api::Error::Transport(ref e) => CoreError::Network {
                reason: e.to_string(),
            },
            vigil_api::Error::Server { status, message } => CoreError::Server { status, message },
            vigil_api::Error::Api { message, .. } => CoreError::Rejected { message },
            vigil_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            vigil_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
