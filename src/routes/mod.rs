//! HTTP route definitions and handlers.
//!
//! This module organizes the endpoints into metrics exposition and health
//! checks, and wraps all of them in the request-tracking middleware.

mod health_routes;
mod metrics;
mod tracking;

pub use tracking::track_requests;

use crate::state::AppState;
use axum::{middleware, Router};

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(metrics::routes())
        .merge(health_routes::routes())
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}
