//! Service configuration types.

use serde::{Deserialize, Serialize};

pub const SANDBOX_API_BASE_URL: &str =
    "https://digital.iservices.rte-france.com/open_api/ecowatt/v4/sandbox/";
pub const PROD_API_BASE_URL: &str = "https://digital.iservices.rte-france.com/open_api/ecowatt/v4/";
pub const DEFAULT_TOKEN_URL: &str = "https://digital.iservices.rte-france.com/token/oauth/";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Use the RTE sandbox (true) or production (false) when no explicit
    /// `api_base_url` is set.
    #[serde(default = "default_true")]
    pub use_sandbox: bool,

    /// Explicit Ecowatt API base URL. Overrides `use_sandbox` when non-empty.
    #[serde(default)]
    pub api_base_url: String,

    /// OAuth token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Pre-shared string sent as `Authorization: Basic <token>`.
    #[serde(default)]
    pub authorization_token: String,

    /// Used to derive `authorization_token` when it is not given directly.
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Timing parameters (seconds).
    #[serde(default)]
    pub timing: TimingConfig,

    /// Address the query API listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Timing parameters, all in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long a bearer credential is reused before renewal.
    #[serde(default = "default_credential_lifetime")]
    pub credential_lifetime_secs: u64,

    /// Upstream rate limit; each cycle sleeps this plus one second.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_secs: u64,

    /// Per-request timeout for both upstream endpoints.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl TimingConfig {
    pub fn cycle_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.rate_limit_secs.saturating_add(1))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Effective API base URL after applying the sandbox switch.
    pub fn resolved_api_base_url(&self) -> &str {
        let explicit = self.api_base_url.trim();
        if !explicit.is_empty() {
            explicit
        } else if self.use_sandbox {
            SANDBOX_API_BASE_URL
        } else {
            PROD_API_BASE_URL
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.into()
}
fn default_listen_addr() -> String {
    "0.0.0.0:8080".into()
}
fn default_credential_lifetime() -> u64 {
    7200
}
fn default_rate_limit() -> u64 {
    3
}
fn default_request_timeout() -> u64 {
    15
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            credential_lifetime_secs: default_credential_lifetime(),
            rate_limit_secs: default_rate_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_sandbox: true,
            api_base_url: String::new(),
            token_url: default_token_url(),
            authorization_token: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            timing: TimingConfig::default(),
            listen_addr: default_listen_addr(),
        }
    }
}
