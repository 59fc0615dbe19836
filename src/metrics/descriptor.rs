use std::fmt;

use serde::Serialize;

use super::error::MetricsError;

/// The three kinds of metric a registry can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    GaugeCallback,
    Counter,
    Timer,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::GaugeCallback => "gauge_callback",
            MetricKind::Counter => "counter",
            MetricKind::Timer => "timer",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed registration input shared by every metric kind.
#[derive(Debug, Clone, Copy)]
pub struct MetricInfo<'a> {
    /// Unique, export-safe identifier, e.g. `requests.response-time`.
    pub name: &'a str,
    /// Short human-readable name.
    pub label: &'a str,
    /// Long human-readable text.
    pub description: &'a str,
    /// Unit of the reported value, e.g. `requests` or `seconds`.
    pub numerator: &'a str,
}

/// Immutable identity and metadata of a registered metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    name: String,
    label: String,
    description: String,
    numerator: String,
    kind: MetricKind,
}

impl MetricDescriptor {
    /// Builds a descriptor, rejecting names that could not double as an
    /// export-line identifier.
    pub fn new(kind: MetricKind, info: MetricInfo<'_>) -> Result<Self, MetricsError> {
        validate_name(info.name)?;
        Ok(MetricDescriptor {
            name: info.name.to_string(),
            label: info.label.to_string(),
            description: info.description.to_string(),
            numerator: info.numerator.to_string(),
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn numerator(&self) -> &str {
        &self.numerator
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }
}

/// Names are non-empty and limited to ASCII letters, digits, `.`, `-` and `_`.
pub fn validate_name(name: &str) -> Result<(), MetricsError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(MetricsError::InvalidName(name.to_string()))
    }
}
