//! Shared types, config, and error definitions for ecowatter.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, FetchError};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
