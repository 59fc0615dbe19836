//! Application startup and server initialization.
//!
//! This module registers the standard metrics against the process-wide
//! registry, builds the router and serves it.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use crate::catalog::{register_standard_metrics, StandardMetrics};
use crate::config::ConfigV1;
use crate::introspection::Introspection;
use crate::metrics::{global_registry, MetricsError, Registry};
use crate::routes;
use crate::state::AppState;

/// Applies the metrics configuration to `registry` and registers the
/// standard catalogue on it.
pub fn init_metrics(
    config: &ConfigV1,
    registry: &Registry,
) -> Result<StandardMetrics, MetricsError> {
    registry.set_failure_log_interval(Duration::from_secs(
        config.metrics.failure_log_interval_secs,
    ));
    let introspection = if config.metrics.host_introspection {
        Introspection::host()
    } else {
        Introspection::default()
    };
    register_standard_metrics(registry, &introspection)
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if a standard metric cannot be registered, if the server
/// fails to bind to the configured address, or if serving fails.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let registry = global_registry();
    let metrics = init_metrics(&config, &registry)?;

    info!("Starting server on {}", config.bind_address);

    let state = AppState {
        config: config.clone(),
        registry,
        metrics,
    };

    let app = routes::create_router(state);
    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
