//! Background synchronization loop.
//!
//! Each cycle renews the bearer credential if it has outlived the configured
//! lifetime, fetches the signal set, installs it into the store, then sleeps
//! `rate_limit_secs + 1`. Failures are logged and retried next cycle; the
//! loop itself only stops when the shutdown channel says so.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use common::config::TimingConfig;
use common::Credential;
use ecowatt_client::{CredentialManager, SignalFetcher};
use signal_store::SignalStore;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A fresh snapshot of `signals` entries was installed.
    Refreshed { signals: usize },
    /// Credential renewal failed; no fetch was attempted.
    RenewalFailed,
    /// The fetch failed; the previous snapshot is still served.
    RefreshFailed,
}

pub struct SyncLoop {
    credentials: CredentialManager,
    fetcher: SignalFetcher,
    store: SignalStore,
    credential_lifetime_secs: u64,
    interval: Duration,
    credential: Option<Credential>,
    last_call: Option<DateTime<Utc>>,
    cycle_id: u64,
}

impl SyncLoop {
    pub fn new(
        credentials: CredentialManager,
        fetcher: SignalFetcher,
        store: SignalStore,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            credentials,
            fetcher,
            store,
            credential_lifetime_secs: timing.credential_lifetime_secs,
            interval: timing.cycle_interval(),
            credential: None,
            last_call: None,
            cycle_id: 0,
        }
    }

    /// The credential currently in use, if any renewal has succeeded.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Wall-clock time of the last successful fetch.
    pub fn last_call(&self) -> Option<DateTime<Utc>> {
        self.last_call
    }

    fn needs_renewal(&self, now: DateTime<Utc>) -> bool {
        self.credential
            .as_ref()
            .map_or(true, |c| c.is_stale_at(now, self.credential_lifetime_secs))
    }

    /// Run one renew-if-stale + refresh pass. Never sleeps.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycle_id = self.cycle_id.saturating_add(1);
        info!("Updating signals (cycle {})...", self.cycle_id);

        if self.needs_renewal(Utc::now()) {
            info!("Retrieving a new bearer token...");
            match self.credentials.renew().await {
                Ok(credential) => {
                    info!(
                        "Bearer token renewed (type={}, server expires_in={}s)",
                        credential.token_type, credential.expires_in_secs
                    );
                    self.credential = Some(credential);
                }
                Err(e) => {
                    warn!("Couldn't retrieve a bearer token: {}", e);
                    return CycleOutcome::RenewalFailed;
                }
            }
        } else {
            debug!("Bearer token is still valid");
        }

        let Some(credential) = self.credential.as_ref() else {
            return CycleOutcome::RenewalFailed;
        };

        match self.fetcher.fetch(credential).await {
            Ok(set) => {
                let count = set.len();
                self.store.replace(set).await;
                let now = Utc::now();
                self.last_call = Some(now);
                info!(
                    "Installed {} signals (last call {})",
                    count,
                    now.to_rfc3339_opts(SecondsFormat::Secs, true)
                );
                CycleOutcome::Refreshed { signals: count }
            }
            Err(e) => {
                warn!("Couldn't update signals: {}", e);
                CycleOutcome::RefreshFailed
            }
        }
    }

    /// Cycle until `shutdown` flips to true or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Sync loop started (interval={}s, credential lifetime={}s)",
            self.interval.as_secs(),
            self.credential_lifetime_secs
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcome = self.run_cycle().await;
            debug!(
                "Cycle {} finished: {:?}. Sleeping {}s...",
                self.cycle_id,
                outcome,
                self.interval.as_secs()
            );

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = shutdown.wait_for(|stop| *stop) => break,
            }
        }

        info!("Sync loop stopped after {} cycles", self.cycle_id);
    }
}
