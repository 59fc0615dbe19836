//! Metric primitives and the registry that owns them.
//!
//! Application code registers gauges, counters and timers once at startup and
//! keeps the returned handles; exporters read everything through
//! [`Registry::snapshot`].

mod counter;
mod descriptor;
mod error;
mod gauge;
mod registry;
mod snapshot;
mod timer;

pub use counter::{Counter, InFlight};
pub use descriptor::{validate_name, MetricDescriptor, MetricInfo, MetricKind};
pub use error::{MetricsError, SampleError};
pub use gauge::{GaugeCallback, GaugeReading};
pub use registry::{global_registry, Metric, Registry};
pub use snapshot::{MetricSnapshot, MetricValue, Snapshot};
pub use timer::{RateUnit, Timer, TimerContext, TimerStats};
