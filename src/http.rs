//! # Read-only HTTP status surface.
//!
//! | Route | Body |
//! |---|---|
//! | `GET /` | `{ service, status: "running", mqttConnected }` |
//! | `GET /version` | `{ version, timestamp }` |
//! | `GET /health` | `{ status: "healthy", mqtt: { connected, brokerUrl }, uptime, timestamp }` |
//! | `GET /device-status` | current status snapshot |
//! | `GET /image-versions` | `{ currentImageVersion, availableImageVersions, timestamp }` |
//!
//! Handlers only take the read lock on the version state, so they observe it either before or
//! after a reconciliation, never in between.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::state::{DeviceIdentity, DeviceStatusSnapshot, StateReader, now_rfc3339};
use crate::transport::Transport;

const SERVICE_NAME: &str = "subco-agent";

/// Everything the handlers read.
#[derive(Clone)]
pub struct StatusView {
    /// Read-only version state.
    pub state: StateReader,
    /// Session, for the connectivity flag and broker address.
    pub transport: Arc<dyn Transport>,
    /// Static identity tags.
    pub identity: DeviceIdentity,
    /// Process start, for uptime.
    pub started_at: Instant,
}

/// Builds the status router.
pub fn router(view: StatusView) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/version", get(version))
        .route("/health", get(health))
        .route("/device-status", get(device_status))
        .route("/image-versions", get(image_versions))
        .with_state(view)
}

/// Serves `view` on `listener` until `stop` is cancelled; in-flight requests finish first.
///
/// The returned handle completes once the listener is closed; a serve error is logged first.
pub fn serve(listener: TcpListener, view: StatusView, stop: CancellationToken) -> JoinHandle<()> {
    let app = router(view);
    tokio::spawn(async move {
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await;
        if let Err(error) = served {
            warn!(%error, "status listener stopped with an error");
        }
    })
}

async fn root(State(view): State<StatusView>) -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "status": "running",
        "mqttConnected": view.transport.is_connected(),
    }))
}

async fn version(State(view): State<StatusView>) -> Json<Value> {
    Json(json!({
        "version": view.state.version().await,
        "timestamp": now_rfc3339(),
    }))
}

async fn health(State(view): State<StatusView>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "mqtt": {
            "connected": view.transport.is_connected(),
            "brokerUrl": view.transport.broker_url(),
        },
        "uptime": view.started_at.elapsed().as_secs(),
        "timestamp": now_rfc3339(),
    }))
}

async fn device_status(State(view): State<StatusView>) -> Json<DeviceStatusSnapshot> {
    let state = view.state.read().await;
    Json(DeviceStatusSnapshot::capture(
        &state,
        &view.identity,
        view.started_at,
    ))
}

async fn image_versions(State(view): State<StatusView>) -> Json<Value> {
    let state = view.state.read().await;
    Json(json!({
        "currentImageVersion": state.current_image_version,
        "availableImageVersions": state.known_image_versions,
        "timestamp": now_rfc3339(),
    }))
}
