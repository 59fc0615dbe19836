use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::error;

use super::descriptor::MetricDescriptor;
use super::error::MetricsError;

/// The time unit a timer's rate is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl RateUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateUnit::Milliseconds => "milliseconds",
            RateUnit::Seconds => "seconds",
            RateUnit::Minutes => "minutes",
            RateUnit::Hours => "hours",
        }
    }

    /// Length of one unit in seconds.
    pub fn seconds(&self) -> f64 {
        match self {
            RateUnit::Milliseconds => 0.001,
            RateUnit::Seconds => 1.0,
            RateUnit::Minutes => 60.0,
            RateUnit::Hours => 3600.0,
        }
    }
}

impl FromStr for RateUnit {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "milliseconds" | "ms" => Ok(RateUnit::Milliseconds),
            "seconds" | "s" => Ok(RateUnit::Seconds),
            "minutes" | "m" => Ok(RateUnit::Minutes),
            "hours" | "h" => Ok(RateUnit::Hours),
            _ => Err(MetricsError::InvalidRateUnit(s.to_string())),
        }
    }
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Committed totals of a timer, always read as a consistent pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStats {
    pub count: u64,
    pub total: Duration,
}

/// Records elapsed-duration samples and derives a count, a sum and a rate.
#[derive(Debug)]
pub struct Timer {
    descriptor: MetricDescriptor,
    counter_numerator: String,
    rate_denominator: RateUnit,
    epoch: Instant,
    stats: Mutex<TimerStats>,
}

impl Timer {
    pub(crate) fn new(
        descriptor: MetricDescriptor,
        counter_numerator: &str,
        rate_denominator: RateUnit,
        epoch: Instant,
    ) -> Self {
        Timer {
            descriptor,
            counter_numerator: counter_numerator.to_string(),
            rate_denominator,
            epoch,
            stats: Mutex::new(TimerStats::default()),
        }
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    pub fn counter_numerator(&self) -> &str {
        &self.counter_numerator
    }

    pub fn rate_denominator(&self) -> RateUnit {
        self.rate_denominator
    }

    /// Starts a measurement. The sample is committed when the returned
    /// context is stopped or dropped.
    pub fn start(self: &Arc<Self>) -> TimerContext {
        TimerContext {
            timer: Arc::clone(self),
            started: Instant::now(),
            done: false,
        }
    }

    /// Commits `ctx` on this timer. Fails without recording anything if the
    /// context was started on another timer.
    pub fn stop(&self, mut ctx: TimerContext) -> Result<Duration, MetricsError> {
        if !std::ptr::eq(Arc::as_ptr(&ctx.timer), self) {
            ctx.done = true;
            let err = MetricsError::ForeignTimerContext {
                expected: self.descriptor.name().to_string(),
                found: ctx.timer.descriptor.name().to_string(),
            };
            error!(
                event_name = "metrics.timer.foreign_context",
                event_domain = "metrics",
                timer = self.descriptor.name(),
                context_timer = ctx.timer.descriptor.name(),
                "refusing to stop a timer context on the wrong timer"
            );
            return Err(err);
        }
        Ok(ctx.stop())
    }

    /// Times a closure.
    pub fn time<T>(self: &Arc<Self>, f: impl FnOnce() -> T) -> T {
        let _ctx = self.start();
        f()
    }

    /// Times a future until it completes or is dropped.
    pub async fn time_async<F: Future>(self: &Arc<Self>, fut: F) -> F::Output {
        let _ctx = self.start();
        fut.await
    }

    /// Commits a duration measured elsewhere.
    pub fn record(&self, elapsed: Duration) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.count = stats.count.saturating_add(1);
        stats.total = stats.total.saturating_add(elapsed);
    }

    pub fn stats(&self) -> TimerStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn count(&self) -> u64 {
        self.stats().count
    }

    /// The count reported under `counter_numerator`.
    pub fn counter_value(&self) -> u64 {
        self.count()
    }

    pub fn total(&self) -> Duration {
        self.stats().total
    }

    /// Samples per `rate_denominator` since the timer's epoch.
    pub fn rate(&self) -> f64 {
        self.rate_at(self.epoch.elapsed())
    }

    /// Samples per `rate_denominator` over the given uptime.
    pub fn rate_at(&self, uptime: Duration) -> f64 {
        rate(self.count(), uptime, self.rate_denominator)
    }
}

pub(crate) fn rate(count: u64, uptime: Duration, unit: RateUnit) -> f64 {
    let units = uptime.as_secs_f64() / unit.seconds();
    if units > 0.0 {
        count as f64 / units
    } else {
        0.0
    }
}

/// An in-flight measurement returned by [`Timer::start`].
///
/// Contexts are independent of each other; only the owning context commits
/// its own sample.
#[must_use = "dropping the context immediately records a near-zero sample"]
pub struct TimerContext {
    timer: Arc<Timer>,
    started: Instant,
    done: bool,
}

impl TimerContext {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Commits the sample and returns its elapsed time.
    pub fn stop(mut self) -> Duration {
        self.commit()
    }

    /// Abandons the measurement without recording anything.
    pub fn discard(mut self) {
        self.done = true;
    }

    fn commit(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.done {
            self.done = true;
            self.timer.record(elapsed);
        }
        elapsed
    }
}

impl Drop for TimerContext {
    fn drop(&mut self) {
        self.commit();
    }
}
