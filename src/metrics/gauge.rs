use std::any::Any;
use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::descriptor::MetricDescriptor;
use super::error::SampleError;

/// Values a gauge callback may return.
///
/// Implemented for the numeric primitives and for `Result<T, E>` so that a
/// callback can report its own failure instead of inventing a number.
pub trait GaugeReading {
    fn into_reading(self) -> Result<f64, String>;
}

macro_rules! impl_gauge_reading {
    ($($t:ty),*) => {
        $(
            impl GaugeReading for $t {
                fn into_reading(self) -> Result<f64, String> {
                    Ok(self as f64)
                }
            }
        )*
    };
}

impl_gauge_reading!(f64, f32, u64, u32, u16, u8, usize, i64, i32, i16, i8, isize);

impl<T, E> GaugeReading for Result<T, E>
where
    T: GaugeReading,
    E: Display,
{
    fn into_reading(self) -> Result<f64, String> {
        match self {
            Ok(value) => value.into_reading(),
            Err(e) => Err(e.to_string()),
        }
    }
}

type GaugeFn = Box<dyn Fn() -> Result<f64, String> + Send + Sync>;

/// A metric whose value is recomputed by its callback on every sample.
pub struct GaugeCallback {
    descriptor: MetricDescriptor,
    raw_counter: bool,
    callback: GaugeFn,
}

impl GaugeCallback {
    pub(crate) fn new<F, R>(descriptor: MetricDescriptor, raw_counter: bool, callback: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: GaugeReading,
    {
        GaugeCallback {
            descriptor,
            raw_counter,
            callback: Box::new(move || callback().into_reading()),
        }
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    /// Whether the value is already an absolute instantaneous count.
    pub fn is_raw_counter(&self) -> bool {
        self.raw_counter
    }

    /// Invokes the callback synchronously. A panicking callback is contained
    /// and reported like any other failure, but the process panic hook still
    /// runs first and prints its message on every sample, outside the
    /// registry's per-gauge log throttling. Callbacks should report expected
    /// failures by returning `Err` instead of panicking.
    pub fn sample(&self) -> Result<f64, SampleError> {
        let value = match catch_unwind(AssertUnwindSafe(|| (self.callback)())) {
            Ok(Ok(value)) => value,
            Ok(Err(reason)) => return Err(SampleError::Failed(reason)),
            Err(payload) => return Err(SampleError::Panicked(panic_message(payload.as_ref()))),
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SampleError::NonFinite(value))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::descriptor::{MetricInfo, MetricKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn gauge<F, R>(callback: F) -> GaugeCallback
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: GaugeReading,
    {
        let descriptor = MetricDescriptor::new(
            MetricKind::GaugeCallback,
            MetricInfo {
                name: "test.gauge",
                label: "Test",
                description: "Test gauge",
                numerator: "things",
            },
        )
        .unwrap();
        GaugeCallback::new(descriptor, false, callback)
    }

    #[test]
    fn samples_are_never_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let g = gauge(move || counted.fetch_add(1, Ordering::SeqCst) + 1);

        assert_eq!(g.sample(), Ok(1.0));
        assert_eq!(g.sample(), Ok(2.0));
        assert_eq!(g.sample(), Ok(3.0));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn callback_error_is_reported() {
        let g = gauge(|| -> Result<u64, String> { Err("table unavailable".to_string()) });
        assert_eq!(
            g.sample(),
            Err(SampleError::Failed("table unavailable".to_string()))
        );
    }

    #[test]
    fn panicking_callback_is_contained() {
        let g = gauge(|| -> u64 { panic!("boom") });
        assert_eq!(g.sample(), Err(SampleError::Panicked("boom".to_string())));
        // still usable afterwards
        assert!(matches!(g.sample(), Err(SampleError::Panicked(_))));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let g = gauge(|| f64::NAN);
        assert!(matches!(g.sample(), Err(SampleError::NonFinite(v)) if v.is_nan()));

        let g = gauge(|| f64::INFINITY);
        assert_eq!(g.sample(), Err(SampleError::NonFinite(f64::INFINITY)));
    }

    #[test]
    fn integer_readings_convert() {
        assert_eq!(gauge(|| 7usize).sample(), Ok(7.0));
        assert_eq!(gauge(|| -3i64).sample(), Ok(-3.0));
        assert_eq!(gauge(|| Ok::<u32, String>(42)).sample(), Ok(42.0));
    }
}
