//! The process-wide catalogue of named metrics.
//!
//! The name → metric mapping sits behind a single `RwLock` that only guards
//! structural changes. Each metric protects its own value, so counter and
//! timer updates never contend with each other or with registration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, warn};

use super::counter::Counter;
use super::descriptor::{MetricDescriptor, MetricInfo, MetricKind};
use super::error::MetricsError;
use super::gauge::{GaugeCallback, GaugeReading};
use super::snapshot::{MetricSnapshot, MetricValue, Snapshot};
use super::timer::{RateUnit, Timer};
use crate::utils::log_throttle::LogThrottle;

const DEFAULT_FAILURE_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// A registered metric of any kind.
#[derive(Clone)]
pub enum Metric {
    Gauge(Arc<GaugeCallback>),
    Counter(Arc<Counter>),
    Timer(Arc<Timer>),
}

impl Metric {
    pub fn descriptor(&self) -> &MetricDescriptor {
        match self {
            Metric::Gauge(g) => g.descriptor(),
            Metric::Counter(c) => c.descriptor(),
            Metric::Timer(t) => t.descriptor(),
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor().name()
    }
}

#[derive(Default)]
struct Catalogue {
    entries: Vec<Metric>,
    index: HashMap<String, usize>,
}

pub struct Registry {
    started_at: Instant,
    catalogue: RwLock<Catalogue>,
    failure_log_interval_ms: AtomicU64,
    failure_logs: LogThrottle,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            started_at: Instant::now(),
            catalogue: RwLock::new(Catalogue::default()),
            failure_log_interval_ms: AtomicU64::new(saturating_millis(DEFAULT_FAILURE_LOG_INTERVAL)),
            failure_logs: LogThrottle::new(),
        }
    }

    /// Time since the registry was created; the denominator of every timer rate.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// How often a persistently failing gauge is logged.
    pub fn set_failure_log_interval(&self, interval: Duration) {
        self.failure_log_interval_ms
            .store(saturating_millis(interval), Ordering::Relaxed);
    }

    fn failure_log_interval(&self) -> Duration {
        Duration::from_millis(self.failure_log_interval_ms.load(Ordering::Relaxed))
    }

    /// Registers a gauge recomputed by `callback` on every snapshot.
    pub fn gauge_callback<F, R>(&self, info: MetricInfo<'_>, callback: F) -> Result<(), MetricsError>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: GaugeReading,
    {
        self.register_gauge(info, false, callback)
    }

    /// Like [`Registry::gauge_callback`], for values that are already an
    /// absolute instantaneous count.
    pub fn raw_gauge_callback<F, R>(
        &self,
        info: MetricInfo<'_>,
        callback: F,
    ) -> Result<(), MetricsError>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: GaugeReading,
    {
        self.register_gauge(info, true, callback)
    }

    fn register_gauge<F, R>(
        &self,
        info: MetricInfo<'_>,
        raw_counter: bool,
        callback: F,
    ) -> Result<(), MetricsError>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: GaugeReading,
    {
        let descriptor = MetricDescriptor::new(MetricKind::GaugeCallback, info)?;
        let gauge = Arc::new(GaugeCallback::new(descriptor, raw_counter, callback));
        self.insert(Metric::Gauge(gauge))
    }

    pub fn counter(&self, info: MetricInfo<'_>) -> Result<Arc<Counter>, MetricsError> {
        let descriptor = MetricDescriptor::new(MetricKind::Counter, info)?;
        let counter = Arc::new(Counter::new(descriptor));
        self.insert(Metric::Counter(counter.clone()))?;
        Ok(counter)
    }

    /// Registers a timer whose count is reported in `counter_numerator` and
    /// whose rate is per `rate_denominator`.
    pub fn timer(
        &self,
        info: MetricInfo<'_>,
        counter_numerator: &str,
        rate_denominator: RateUnit,
    ) -> Result<Arc<Timer>, MetricsError> {
        let descriptor = MetricDescriptor::new(MetricKind::Timer, info)?;
        let timer = Arc::new(Timer::new(
            descriptor,
            counter_numerator,
            rate_denominator,
            self.started_at,
        ));
        self.insert(Metric::Timer(timer.clone()))?;
        Ok(timer)
    }

    /// Adds a metric, rejecting names that are already taken. The existing
    /// metric is left untouched.
    fn insert(&self, metric: Metric) -> Result<(), MetricsError> {
        let mut catalogue = self.catalogue.write().unwrap_or_else(PoisonError::into_inner);
        let name = metric.name().to_string();

        if let Some(&position) = catalogue.index.get(&name) {
            let existing = catalogue.entries[position].descriptor().kind();
            error!(
                event_name = "metrics.registry.conflict",
                event_domain = "metrics",
                metric = name.as_str(),
                existing_kind = existing.as_str(),
                requested_kind = metric.descriptor().kind().as_str(),
                "metric name is already registered"
            );
            return Err(MetricsError::DescriptorConflict { name, existing });
        }

        debug!(
            event_name = "metrics.registry.registered",
            event_domain = "metrics",
            metric = name.as_str(),
            kind = metric.descriptor().kind().as_str(),
            "registered metric"
        );
        let position = catalogue.entries.len();
        catalogue.entries.push(metric);
        catalogue.index.insert(name, position);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Metric> {
        let catalogue = self.catalogue.read().unwrap_or_else(PoisonError::into_inner);
        catalogue
            .index
            .get(name)
            .map(|&position| catalogue.entries[position].clone())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.metrics().iter().map(|m| m.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.catalogue
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn metrics(&self) -> Vec<Metric> {
        self.catalogue
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    /// Reads every metric once, in registration order.
    ///
    /// Gauge callbacks run after the catalogue lock is released, so a slow
    /// callback delays this snapshot only. A failing gauge is reported
    /// without a value and does not affect the other entries.
    pub fn snapshot(&self) -> Snapshot {
        let metrics = self.metrics();
        let uptime = self.uptime();
        let taken_at = Utc::now();

        let metrics = metrics
            .iter()
            .map(|metric| MetricSnapshot {
                descriptor: metric.descriptor().clone(),
                value: self.read_value(metric, uptime),
            })
            .collect();

        Snapshot {
            taken_at,
            uptime_seconds: uptime.as_secs_f64(),
            metrics,
        }
    }

    /// Reads a single metric by name.
    pub fn snapshot_one(&self, name: &str) -> Option<MetricSnapshot> {
        let metric = self.get(name)?;
        Some(MetricSnapshot {
            descriptor: metric.descriptor().clone(),
            value: self.read_value(&metric, self.uptime()),
        })
    }

    fn read_value(&self, metric: &Metric, uptime: Duration) -> MetricValue {
        match metric {
            Metric::Gauge(gauge) => match gauge.sample() {
                Ok(value) => MetricValue::Gauge {
                    value: Some(value),
                    raw_counter: gauge.is_raw_counter(),
                    error: None,
                },
                Err(e) => {
                    let name = gauge.descriptor().name();
                    if let Some(suppressed) =
                        self.failure_logs.should_emit(name, self.failure_log_interval())
                    {
                        warn!(
                            event_name = "metrics.gauge.sample_failed",
                            event_domain = "metrics",
                            metric = name,
                            suppressed_failures = suppressed,
                            error = %e,
                            "gauge callback failed; reporting it as unavailable"
                        );
                    }
                    MetricValue::Gauge {
                        value: None,
                        raw_counter: gauge.is_raw_counter(),
                        error: Some(e.to_string()),
                    }
                }
            },
            Metric::Counter(counter) => MetricValue::Counter {
                value: counter.read(),
            },
            Metric::Timer(timer) => {
                let stats = timer.stats();
                MetricValue::Timer {
                    count: stats.count,
                    total_seconds: stats.total.as_secs_f64(),
                    rate: super::timer::rate(stats.count, uptime, timer.rate_denominator()),
                    counter_numerator: timer.counter_numerator().to_string(),
                    rate_denominator: timer.rate_denominator(),
                }
            }
        }
    }
}

fn saturating_millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

static GLOBAL_REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// The process-wide registry, created on first use and never torn down.
///
/// Prefer passing the returned handle down explicitly; tests build their own
/// `Registry` instead.
pub fn global_registry() -> Arc<Registry> {
    GLOBAL_REGISTRY
        .get_or_init(|| Arc::new(Registry::new()))
        .clone()
}
