//! Authenticated fetch of the Ecowatt signal set.

use common::{Credential, Error, FetchError, SignalSet, SignalsResponse};
use tracing::debug;
use url::Url;

use crate::{format_reqwest_error, summarize_response_body};

/// Fetches `GET <base>/signals` with a bearer credential.
#[derive(Debug, Clone)]
pub struct SignalFetcher {
    client: reqwest::Client,
    signals_url: Url,
}

/// Resolve `<base>/signals`, tolerating a base URL with or without a
/// trailing slash.
pub fn signals_url(base: &Url) -> Result<Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("signals")
        .map_err(|e| Error::Config(format!("cannot build signals URL from {base}: {e}")))
}

impl SignalFetcher {
    pub fn new(client: reqwest::Client, api_base_url: &Url) -> Result<Self, Error> {
        Ok(Self {
            client,
            signals_url: signals_url(api_base_url)?,
        })
    }

    pub fn signals_url(&self) -> &Url {
        &self.signals_url
    }

    /// Fetch the current signals, sorted ascending by day. No retry.
    pub async fn fetch(&self, credential: &Credential) -> Result<SignalSet, Error> {
        debug!("GET {}", self.signals_url);

        let resp = self
            .client
            .get(self.signals_url.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                credential.authorization_header(),
            )
            .send()
            .await
            .map_err(|e| FetchError::Transport(format_reqwest_error(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: summarize_response_body(&body),
            }
            .into());
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(format_reqwest_error(&e)))?;

        let payload: SignalsResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        debug!("Decoded {} signals", payload.signals.len());

        Ok(SignalSet::from_unsorted(payload.signals))
    }
}
