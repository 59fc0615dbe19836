//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! configuration, the metric registry and the standard metric handles.

use crate::catalog::StandardMetrics;
use crate::config::ConfigV1;
use crate::metrics::Registry;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Registry read by the metrics endpoints.
    pub registry: Arc<Registry>,
    /// Handles mutated by the request middleware and authentication call sites.
    pub metrics: StandardMetrics,
}
