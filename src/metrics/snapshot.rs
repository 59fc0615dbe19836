use chrono::{DateTime, Utc};
use serde::Serialize;

use super::descriptor::MetricDescriptor;
use super::timer::RateUnit;

/// Point-in-time read of every registered metric, in registration order.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub uptime_seconds: f64,
    pub metrics: Vec<MetricSnapshot>,
}

impl Snapshot {
    pub fn get(&self, name: &str) -> Option<&MetricSnapshot> {
        self.metrics.iter().find(|m| m.descriptor.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.descriptor.name()).collect()
    }
}

/// One metric's descriptor together with its current value(s).
#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    #[serde(flatten)]
    pub descriptor: MetricDescriptor,
    #[serde(flatten)]
    pub value: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// `value` is `None` when the callback failed; `error` says why.
    Gauge {
        value: Option<f64>,
        raw_counter: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Counter {
        value: i64,
    },
    Timer {
        count: u64,
        total_seconds: f64,
        rate: f64,
        counter_numerator: String,
        rate_denominator: RateUnit,
    },
}

impl MetricValue {
    /// The single headline number: gauge or counter value, timer count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge { value, .. } => *value,
            MetricValue::Counter { value } => Some(*value as f64),
            MetricValue::Timer { count, .. } => Some(*count as f64),
        }
    }

    pub fn is_available(&self) -> bool {
        self.as_f64().is_some()
    }
}
