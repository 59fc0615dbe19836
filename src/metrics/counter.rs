use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::descriptor::MetricDescriptor;

/// A cumulative total adjusted by signed deltas.
///
/// Updates are lock-free and saturate at the `i64` bounds instead of
/// wrapping.
#[derive(Debug)]
pub struct Counter {
    descriptor: MetricDescriptor,
    value: AtomicI64,
}

impl Counter {
    pub(crate) fn new(descriptor: MetricDescriptor) -> Self {
        Counter {
            descriptor,
            value: AtomicI64::new(0),
        }
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    /// Adds `delta`, which may be negative.
    pub fn increment(&self, delta: i64) {
        // The closure never returns None, so the update always succeeds.
        let _ = self
            .value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_add(delta))
            });
    }

    pub fn inc(&self) {
        self.increment(1);
    }

    pub fn dec(&self) {
        self.increment(-1);
    }

    pub fn read(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Increments now and decrements when the returned guard is dropped.
    pub fn track(self: &Arc<Self>) -> InFlight {
        self.inc();
        InFlight {
            counter: Arc::clone(self),
        }
    }
}

/// Guard returned by [`Counter::track`].
#[must_use = "dropping the guard immediately decrements the counter again"]
pub struct InFlight {
    counter: Arc<Counter>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counter.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::descriptor::{MetricInfo, MetricKind};
    use std::thread;

    fn counter() -> Arc<Counter> {
        let descriptor = MetricDescriptor::new(
            MetricKind::Counter,
            MetricInfo {
                name: "test.counter",
                label: "Test",
                description: "Test counter",
                numerator: "things",
            },
        )
        .unwrap();
        Arc::new(Counter::new(descriptor))
    }

    #[test]
    fn starts_at_zero_and_accepts_negative_deltas() {
        let c = counter();
        assert_eq!(c.read(), 0);
        c.increment(5);
        c.increment(-8);
        assert_eq!(c.read(), -3);
        c.inc();
        c.dec();
        c.dec();
        assert_eq!(c.read(), -4);
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let c = counter();
        c.increment(i64::MAX);
        c.increment(10);
        assert_eq!(c.read(), i64::MAX);

        c.increment(i64::MIN);
        c.increment(i64::MIN);
        assert_eq!(c.read(), i64::MIN);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let c = counter();
        thread::scope(|s| {
            for _ in 0..100 {
                s.spawn(|| {
                    for _ in 0..10_000 {
                        c.increment(1);
                    }
                });
            }
        });
        assert_eq!(c.read(), 1_000_000);
    }

    #[test]
    fn mixed_sign_concurrent_updates_sum_exactly() {
        let c = counter();
        thread::scope(|s| {
            for t in 0..16i64 {
                let c = &c;
                s.spawn(move || {
                    for _ in 0..1_000 {
                        c.increment(t - 5);
                    }
                });
            }
        });
        let expected: i64 = (0..16i64).map(|t| (t - 5) * 1_000).sum();
        assert_eq!(c.read(), expected);
    }

    #[test]
    fn in_flight_guard_balances() {
        let c = counter();
        {
            let _a = c.track();
            let _b = c.track();
            assert_eq!(c.read(), 2);
        }
        assert_eq!(c.read(), 0);
    }
}
