// Guard service authentication endpoints
//
// Password login issuing a bearer token, plus account registration.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::GuardClient;
use crate::error::Error;
use crate::models::{LoginRequest, RegisterRequest, TokenResponse, UserRecord};

impl GuardClient {
    /// Exchange credentials for a bearer token.
    ///
    /// `POST /token` — 401 means wrong username or password.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, Error> {
        let url = self.api_url("token")?;
        debug!(username, "logging in");
        self.post(
            url,
            &LoginRequest {
                username,
                password: password.expose_secret(),
            },
            None,
        )
        .await
    }

    /// Register a new account.
    ///
    /// `POST /users/` — the service rejects duplicate usernames with 400.
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<UserRecord, Error> {
        let url = self.api_url("users/")?;
        debug!(username, "registering account");
        self.post(
            url,
            &RegisterRequest {
                username,
                password: password.expose_secret(),
            },
            None,
        )
        .await
    }
}
