//! In-memory holder for the latest signal snapshot.
//!
//! One writer (the sync loop) installs whole snapshots; any number of
//! readers (query handlers) get an `Arc` to whichever snapshot was current.
//! The lock only guards the pointer swap, so readers never see a partially
//! built set.

use std::sync::Arc;

use common::{Error, Signal, SignalSet};
use tokio::sync::RwLock;
use tracing::debug;

/// Thread-safe, cheaply clonable handle to the current `SignalSet`.
#[derive(Debug, Clone, Default)]
pub struct SignalStore {
    current: Arc<RwLock<Option<Arc<SignalSet>>>>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `set` as the current snapshot, dropping the previous one.
    pub async fn replace(&self, set: SignalSet) {
        let next = Arc::new(set);
        let len = next.len();
        *self.current.write().await = Some(next);
        debug!("Installed snapshot with {} signals", len);
    }

    /// The current snapshot, or `NotReady` before the first install.
    pub async fn get_all(&self) -> Result<Arc<SignalSet>, Error> {
        self.current.read().await.clone().ok_or(Error::NotReady)
    }

    /// Signal at positional offset `day` (0 = earliest date in the snapshot).
    pub async fn get_by_day(&self, day: i64) -> Result<Signal, Error> {
        let snapshot = self.get_all().await?;
        let available = snapshot.len();

        usize::try_from(day)
            .ok()
            .and_then(|idx| snapshot.get(idx))
            .cloned()
            .ok_or(Error::OutOfRange { day, available })
    }

    pub async fn is_ready(&self) -> bool {
        self.current.read().await.is_some()
    }
}
