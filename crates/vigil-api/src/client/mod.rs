// Guard service HTTP client modules
//
// Hand-written client for the guard service's JSON endpoints. Split into
// auth, device, and log modules implemented as inherent methods so this
// module stays focused on transport mechanics.

pub mod auth;
pub mod devices;
pub mod logs;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the guard service.
///
/// Handles URL construction, bearer-token injection, and status-code
/// mapping. Error payloads use the `{"detail": "..."}` shape; the detail
/// string is surfaced in the returned error, never the raw response.
pub struct GuardClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Error body shape used by the service for 4xx/5xx responses.
#[derive(Debug, serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<String>,
}

impl GuardClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` should be the service root (e.g. `https://guard.local:8000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path relative to the service root.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request, optionally bearer-authenticated.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let mut req = self.http.get(url);
        if let Some(token) = token {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    /// Send a POST request with a JSON body, optionally bearer-authenticated.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let mut req = self.http.post(url).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    /// Map the response status and decode the JSON payload.
    ///
    /// 401 becomes `Error::Authentication`, other 4xx become `Error::Api`
    /// with the service's `detail` message, 5xx become `Error::Server`.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: extract_detail(&body)
                    .unwrap_or_else(|| "token rejected or expired".into()),
            });
        }

        if status.is_server_error() {
            return Err(Error::Server {
                status: status.as_u16(),
                message: extract_detail(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        if status.is_client_error() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: extract_detail(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Pull the `detail` string out of an error body, if it parses as one.
fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorDetail>(body)
        .ok()
        .and_then(|d| d.detail)
}
