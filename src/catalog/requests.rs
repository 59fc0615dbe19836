use std::sync::Arc;

use crate::metrics::{Counter, MetricInfo, MetricsError, RateUnit, Registry, Timer};

/// Handles for the per-request metrics updated by the HTTP middleware.
#[derive(Clone)]
pub struct RequestMetrics {
    pub active: Arc<Counter>,
    pub exceptions: Arc<Counter>,
    pub response_time: Arc<Timer>,
}

impl RequestMetrics {
    pub fn register(registry: &Registry) -> Result<Self, MetricsError> {
        let active = registry.counter(MetricInfo {
            name: "requests.active",
            label: "Active Requests",
            description: "Number of currently active requests",
            numerator: "requests",
        })?;

        let exceptions = registry.counter(MetricInfo {
            name: "requests.exceptions",
            label: "Request Exceptions",
            description: "Number of requests that resulted in an exception",
            numerator: "requests",
        })?;

        let response_time = registry.timer(
            MetricInfo {
                name: "requests.response-time",
                label: "Request Response Time",
                description: "Time taken to respond to requests across all endpoints",
                numerator: "seconds",
            },
            "requests",
            RateUnit::Seconds,
        )?;

        Ok(RequestMetrics {
            active,
            exceptions,
            response_time,
        })
    }
}
