//! Unified error type for ecowatter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Signal fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Signals are not available yet")]
    NotReady,

    #[error("Day {day} is out of range ({available} days available)")]
    OutOfRange { day: i64, available: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The three ways a signals request can fail.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("signals endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("could not decode signals body: {0}")]
    Decode(String),
}
