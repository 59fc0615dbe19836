//! Metrics exposition endpoints.

use crate::metrics::{MetricSnapshot, Snapshot};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tokio::task::{spawn_blocking, JoinError};
use tracing::error;

/// Creates the metrics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(snapshot_handler))
        .route("/metrics/:name", get(metric_handler))
}

/// Returns a JSON snapshot of every registered metric, in registration order.
///
/// Gauge callbacks may block, so sampling runs on the blocking pool: a slow
/// gauge delays this response only. A failing gauge is listed with a null value.
async fn snapshot_handler(State(state): State<AppState>) -> Result<Json<Snapshot>, HTTPError> {
    let registry = state.registry.clone();
    spawn_blocking(move || registry.snapshot())
        .await
        .map(Json)
        .map_err(sampling_failed)
}

async fn metric_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MetricSnapshot>, HTTPError> {
    let registry = state.registry.clone();
    let lookup = name.clone();
    spawn_blocking(move || registry.snapshot_one(&lookup))
        .await
        .map_err(sampling_failed)?
        .map(Json)
        .ok_or_else(|| HTTPError::not_found(format!("Unknown metric '{}'", name)))
}

fn sampling_failed(e: JoinError) -> HTTPError {
    error!(
        event_name = "metrics.snapshot.join_failed",
        event_domain = "metrics",
        error = %e,
        "snapshot task did not complete"
    );
    HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to sample metrics")
}
