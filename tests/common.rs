#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use metricsd::catalog::StandardMetrics;
use metricsd::config::{parse_config, ConfigV1};
use metricsd::metrics::Registry;
use metricsd::routes::create_router;
use metricsd::startup::init_metrics;
use metricsd::state::AppState;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: "127.0.0.1:0"
logging:
  level: "debug"
  format: "json"
metrics:
  host_introspection: false
  failure_log_interval_secs: 1
"#;

pub fn test_config() -> ConfigV1 {
    parse_config(TEST_CONFIG).expect("test config should parse")
}

/// Builds application state on an isolated registry with the standard catalogue.
pub fn build_state() -> AppState {
    let config = Arc::new(test_config());
    let registry = Arc::new(Registry::new());
    let metrics: StandardMetrics =
        init_metrics(&config, &registry).expect("standard metrics should register");
    AppState {
        config,
        registry,
        metrics,
    }
}

pub fn build_app() -> (Router, AppState) {
    let state = build_state();
    (create_router(state.clone()), state)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
