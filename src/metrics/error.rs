use thiserror::Error;

use super::descriptor::MetricKind;

/// Errors raised while registering or mutating metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("invalid metric name '{0}': expected letters, digits, '.', '-' or '_'")]
    InvalidName(String),

    #[error("metric '{name}' is already registered as a {existing}")]
    DescriptorConflict { name: String, existing: MetricKind },

    #[error("timer context started on '{found}' cannot be stopped on '{expected}'")]
    ForeignTimerContext { expected: String, found: String },

    #[error("unknown rate unit '{0}'")]
    InvalidRateUnit(String),
}

/// Why a gauge callback could not produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("callback failed: {0}")]
    Failed(String),

    #[error("callback panicked: {0}")]
    Panicked(String),

    #[error("callback returned a non-finite value ({0})")]
    NonFinite(f64),
}
