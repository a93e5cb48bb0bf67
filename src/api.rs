//! HTTP query surface over the signal store.
//!
//! `GET /signals` and `GET /signals/:day`. Store outcomes map to status
//! codes here; the store itself knows nothing about HTTP.

use std::net::SocketAddr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::Error;
use serde_json::json;
use signal_store::SignalStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub fn router(store: SignalStore) -> Router {
    Router::new()
        .route("/signals", get(list_signals))
        .route("/signals/:day", get(day_signal))
        .with_state(store)
}

/// Bind `addr` (port 0 picks a free port) and serve until `shutdown` is set.
///
/// Returns the server task and the address actually bound.
pub async fn start_api_server_on(
    addr: SocketAddr,
    store: SignalStore,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(JoinHandle<()>, SocketAddr), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Query API listening on http://{}", actual_addr);

    let app = router(store);
    let handle = tokio::spawn(async move {
        let stop = async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(stop)
            .await
        {
            error!("Query API server error: {}", e);
        }
    });

    Ok((handle, actual_addr))
}

fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        Error::OutOfRange { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

async fn list_signals(State(store): State<SignalStore>) -> Response {
    match store.get_all().await {
        Ok(set) => Json(set.as_slice()).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn day_signal(State(store): State<SignalStore>, Path(raw_day): Path<String>) -> Response {
    let Ok(day) = raw_day.trim().parse::<i64>() else {
        debug!("Rejecting non-integer day {:?}", raw_day);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("day must be an integer, got {raw_day:?}") })),
        )
            .into_response();
    };

    match store.get_by_day(day).await {
        Ok(signal) => Json(signal).into_response(),
        Err(e) => error_response(&e),
    }
}
