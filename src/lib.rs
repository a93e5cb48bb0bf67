//! Ecowatter: keeps the latest RTE Ecowatt grid signals in memory and
//! serves them over a small read-only HTTP API.

pub mod api;
pub mod config;
pub mod sync;

pub use sync::{CycleOutcome, SyncLoop};
