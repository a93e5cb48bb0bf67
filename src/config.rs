//! Configuration loader — merges env vars, .env file, and config.toml.

use std::net::SocketAddr;
use std::path::Path;

use base64::Engine;
use common::config::AppConfig;
use common::Error;

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

fn parse_secs(raw: &str, env_name: &str) -> Result<u64, Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer >= 0")))
}

/// Apply `ECOWATTER_*` overrides. `var` looks a variable up by name.
pub fn apply_env_overrides<F>(config: &mut AppConfig, var: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

    if let Some(raw) = non_empty("ECOWATTER_USE_SANDBOX") {
        config.use_sandbox = parse_bool(&raw);
    }
    if let Some(url) = non_empty("ECOWATTER_API_BASE_URL") {
        config.api_base_url = url.trim().to_string();
    }
    if let Some(url) = non_empty("ECOWATTER_TOKEN_URL") {
        config.token_url = url.trim().to_string();
    }
    if let Some(token) = non_empty("ECOWATTER_AUTH_TOKEN") {
        config.authorization_token = token.trim().to_string();
    }
    if let Some(id) = non_empty("ECOWATTER_CLIENT_ID") {
        config.client_id = id.trim().to_string();
    }
    if let Some(secret) = non_empty("ECOWATTER_CLIENT_SECRET") {
        config.client_secret = secret.trim().to_string();
    }
    if let Some(raw) = non_empty("ECOWATTER_CREDENTIAL_LIFETIME_SECS") {
        config.timing.credential_lifetime_secs =
            parse_secs(&raw, "ECOWATTER_CREDENTIAL_LIFETIME_SECS")?;
    }
    if let Some(raw) = non_empty("ECOWATTER_RATE_LIMIT_SECS") {
        config.timing.rate_limit_secs = parse_secs(&raw, "ECOWATTER_RATE_LIMIT_SECS")?;
    }
    if let Some(raw) = non_empty("ECOWATTER_REQUEST_TIMEOUT_SECS") {
        config.timing.request_timeout_secs = parse_secs(&raw, "ECOWATTER_REQUEST_TIMEOUT_SECS")?;
    }
    if let Some(addr) = non_empty("ECOWATTER_LISTEN_ADDR") {
        config.listen_addr = addr.trim().to_string();
    }

    Ok(())
}

/// Fill `authorization_token` from client id/secret when it was not given.
///
/// The RTE portal expects `base64(client_id:client_secret)`.
pub fn derive_authorization_token(config: &mut AppConfig) {
    if !config.authorization_token.is_empty()
        || config.client_id.is_empty()
        || config.client_secret.is_empty()
    {
        return;
    }
    let pair = format!("{}:{}", config.client_id, config.client_secret);
    config.authorization_token = base64::engine::general_purpose::STANDARD.encode(pair);
}

pub fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.authorization_token.is_empty() {
        issues.push(
            "ECOWATTER_AUTH_TOKEN (or ECOWATTER_CLIENT_ID + ECOWATTER_CLIENT_SECRET) is required"
                .into(),
        );
    }
    if let Err(e) = ecowatt_client::parse_endpoint(config.resolved_api_base_url(), "api_base_url")
    {
        issues.push(e.to_string());
    }
    if let Err(e) = ecowatt_client::parse_endpoint(&config.token_url, "token_url") {
        issues.push(e.to_string());
    }
    if config.timing.credential_lifetime_secs == 0 {
        issues.push("timing.credential_lifetime_secs must be > 0".into());
    }
    if config.timing.request_timeout_secs == 0 {
        issues.push("timing.request_timeout_secs must be > 0".into());
    }
    if config.listen_addr.parse::<SocketAddr>().is_err() {
        issues.push(format!(
            "listen_addr must be a socket address like 0.0.0.0:8080, got {:?}",
            config.listen_addr
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    derive_authorization_token(&mut config);

    validate_config(&config)?;

    Ok(config)
}
