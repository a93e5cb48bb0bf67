//! Ecowatter: RTE Ecowatt signal cache.
//!
//! Single-binary Tokio application that:
//! 1. Renews an OAuth bearer token when it outlives its configured lifetime
//! 2. Polls the Ecowatt signals endpoint at a fixed rate-limited cadence
//! 3. Serves the latest sorted snapshot over `GET /signals[/:day]`

use std::net::SocketAddr;

use clap::Parser;
use common::{AppConfig, Error};
use ecowatt_client::{build_http_client, parse_endpoint, CredentialManager, SignalFetcher};
use ecowatter::api::start_api_server_on;
use ecowatter::{config, CycleOutcome, SyncLoop};
use signal_store::SignalStore;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// RTE Ecowatt signal cache and query API
#[derive(Parser)]
#[command(name = "ecowatter", about = "RTE Ecowatt signal cache and query API")]
struct Cli {
    /// Just renew a bearer token and report it, then exit.
    #[arg(long)]
    check_auth: bool,

    /// Run a single sync cycle, print the snapshot as JSON, and exit.
    #[arg(long, conflicts_with = "check_auth")]
    once: bool,
}

fn build_clients(cfg: &AppConfig) -> Result<(CredentialManager, SignalFetcher), Error> {
    let http = build_http_client(cfg.timing.request_timeout())?;
    let token_url = parse_endpoint(&cfg.token_url, "token_url")?;
    let api_base_url = parse_endpoint(cfg.resolved_api_base_url(), "api_base_url")?;

    let credentials =
        CredentialManager::new(http.clone(), token_url, cfg.authorization_token.clone());
    let fetcher = SignalFetcher::new(http, &api_base_url)?;
    Ok((credentials, fetcher))
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ecowatter=info,ecowatt_client=info,signal_store=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Ecowatter starting up...");

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let env_label = if cfg.api_base_url.trim().is_empty() {
        if cfg.use_sandbox {
            "SANDBOX"
        } else {
            "PRODUCTION"
        }
    } else {
        "CUSTOM"
    };
    info!("Environment: {} ({})", env_label, cfg.resolved_api_base_url());
    info!(
        "Timing: credential_lifetime={}s, rate_limit={}s, request_timeout={}s",
        cfg.timing.credential_lifetime_secs,
        cfg.timing.rate_limit_secs,
        cfg.timing.request_timeout_secs,
    );

    let (credentials, fetcher) = match build_clients(&cfg) {
        Ok(clients) => clients,
        Err(e) => {
            error!("Client initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    // ── Check-auth mode ──────────────────────────────────────────────
    if cli.check_auth {
        info!("Running auth check against {}...", credentials.token_url());
        match credentials.renew().await {
            Ok(credential) => {
                info!(
                    "Auth successful: token_type={}, server expires_in={}s",
                    credential.token_type, credential.expires_in_secs
                );
            }
            Err(e) => {
                error!("Auth check failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    info!("Signals endpoint: {}", fetcher.signals_url());

    let store = SignalStore::new();
    let mut sync_loop = SyncLoop::new(credentials, fetcher, store.clone(), &cfg.timing);

    // ── Single-cycle mode ────────────────────────────────────────────
    if cli.once {
        info!("Running a single sync cycle...");
        match sync_loop.run_cycle().await {
            CycleOutcome::Refreshed { signals } => {
                info!("Fetched {} signals", signals);
            }
            outcome => {
                error!("Sync cycle failed: {:?}", outcome);
                std::process::exit(1);
            }
        }
        let rendered = store
            .get_all()
            .await
            .map_err(|e| e.to_string())
            .and_then(|set| serde_json::to_string_pretty(&*set).map_err(|e| e.to_string()));
        match rendered {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Couldn't render snapshot: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // ── Spawn tasks ──────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listen_addr: SocketAddr = match cfg.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid listen address {}: {}", cfg.listen_addr, e);
            std::process::exit(1);
        }
    };
    let (mut api_handle, _bound) =
        match start_api_server_on(listen_addr, store.clone(), shutdown_rx.clone()).await {
            Ok(started) => started,
            Err(e) => {
                error!("Failed to start query API: {}", e);
                std::process::exit(1);
            }
        };

    let mut sync_handle = tokio::spawn(sync_loop.run(shutdown_rx));

    // ── Wait for shutdown ────────────────────────────────────────────
    info!("Ecowatter is running. Press Ctrl+C to stop.");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        r = &mut sync_handle => {
            error!("Sync task exited: {:?}", r);
        }
        r = &mut api_handle => {
            error!("Query API task exited: {:?}", r);
        }
    }

    if shutdown_tx.send(true).is_err() {
        warn!("All tasks had already stopped");
    }
    for (name, handle) in [("sync", sync_handle), ("api", api_handle)] {
        if handle.is_finished() {
            continue;
        }
        if let Err(e) = handle.await {
            warn!("{} task ended abnormally: {}", name, e);
        }
    }

    info!("Ecowatter shut down.");
}
