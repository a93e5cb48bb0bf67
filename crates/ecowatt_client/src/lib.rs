//! RTE Ecowatt API client library.
//!
//! Provides the OAuth credential renewal call and the authenticated
//! signals fetch. Neither retries; callers decide when to try again.

pub mod auth;
pub mod rest;

pub use auth::CredentialManager;
pub use rest::SignalFetcher;

use std::error::Error as StdError;
use std::time::Duration;

use common::Error;
use url::Url;

const USER_AGENT: &str = concat!("ecowatter/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by both endpoints.
///
/// Every request carries `timeout` so an unresponsive upstream cannot stall
/// a sync cycle.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(2)
        .tcp_keepalive(Duration::from_secs(30))
        .timeout(timeout)
        .build()
        .map_err(|e| {
            Error::Config(format!(
                "failed to build HTTP client: {}",
                format_reqwest_error(&e)
            ))
        })
}

/// Parse an absolute http(s) URL.
pub fn parse_endpoint(raw: &str, name: &str) -> Result<Url, Error> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("{name} is not a valid URL ({raw}): {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "{name} must use http or https, got {other}"
        ))),
    }
}

pub(crate) fn format_reqwest_error(err: &reqwest::Error) -> String {
    // Keep chained causes so network failures (DNS/TLS/socket) are visible.
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

pub(crate) fn summarize_response_body(raw: &str) -> String {
    const MAX_CHARS: usize = 500;
    let compact = raw.replace(['\n', '\r'], " ");
    match compact.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &compact[..cut]),
        None => compact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_compacts_newlines() {
        assert_eq!(summarize_response_body("a\nb\r\nc"), "a b  c");
    }

    #[test]
    fn test_summarize_truncates_on_char_boundary() {
        let long = "é".repeat(600);
        let summary = summarize_response_body(&long);
        assert_eq!(summary.chars().count(), 501);
        assert!(summary.ends_with('…'));
    }

    #[test]
    fn test_parse_endpoint_rejects_non_http() {
        assert!(parse_endpoint("https://example.com/token/", "token_url").is_ok());
        assert!(matches!(
            parse_endpoint("ftp://example.com", "token_url"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_endpoint("not a url", "token_url"),
            Err(Error::Config(_))
        ));
    }
}
