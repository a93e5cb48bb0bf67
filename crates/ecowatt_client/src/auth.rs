//! OAuth client-credentials renewal for the RTE data portal.
//!
//! The token endpoint is called with `Authorization: Basic <token>`, where
//! `<token>` is an opaque pre-shared string handed in by configuration.

use chrono::Utc;
use common::{Credential, Error};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{format_reqwest_error, summarize_response_body};

/// Body returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
}

/// Obtains bearer credentials. Stateless between calls: the caller owns the
/// current credential and decides when to renew it.
#[derive(Clone)]
pub struct CredentialManager {
    client: reqwest::Client,
    token_url: Url,
    authorization_token: String,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("token_url", &self.token_url.as_str())
            .field("authorization_token", &"<redacted>")
            .finish()
    }
}

impl CredentialManager {
    pub fn new(client: reqwest::Client, token_url: Url, authorization_token: String) -> Self {
        Self {
            client,
            token_url,
            authorization_token,
        }
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Perform a single renewal request. No retry.
    pub async fn renew(&self) -> Result<Credential, Error> {
        debug!("GET {}", self.token_url);

        let resp = self
            .client
            .get(self.token_url.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", self.authorization_token),
            )
            .send()
            .await
            .map_err(|e| {
                Error::Credential(format!(
                    "couldn't reach token endpoint: {}",
                    format_reqwest_error(&e)
                ))
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            Error::Credential(format!(
                "couldn't read token response: {}",
                format_reqwest_error(&e)
            ))
        })?;

        if !status.is_success() {
            return Err(Error::Credential(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                summarize_response_body(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Credential(format!("couldn't decode token response: {e}"))
        })?;

        Ok(Credential {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in_secs: token.expires_in,
            obtained_at: Utc::now(),
        })
    }
}
