use std::sync::Arc;

use crate::introspection::{GcStats, ProcessStats, ThreadStats};
use crate::metrics::{MetricInfo, MetricsError, Registry};

pub fn register_thread_metrics(
    registry: &Registry,
    threads: Arc<dyn ThreadStats>,
) -> Result<(), MetricsError> {
    registry.gauge_callback(
        MetricInfo {
            name: "process.threads.total",
            label: "Thread Count",
            description: "Number of threads",
            numerator: "threads",
        },
        move || threads.count(),
    )
}

pub fn register_process_metrics(
    registry: &Registry,
    processes: Arc<dyn ProcessStats>,
) -> Result<(), MetricsError> {
    let total = processes.clone();
    registry.gauge_callback(
        MetricInfo {
            name: "process.children.total",
            label: "Process Count",
            description: "Number of child processes",
            numerator: "processes",
        },
        move || total.total(),
    )?;

    registry.gauge_callback(
        MetricInfo {
            name: "process.children.active",
            label: "Active Child Processes",
            description: "Number of child processes that are still running",
            numerator: "processes",
        },
        move || processes.active_count(),
    )
}

/// One raw-counter gauge per collector generation plus their sum.
pub fn register_gc_metrics(registry: &Registry, gc: Arc<dyn GcStats>) -> Result<(), MetricsError> {
    for generation in 0..gc.generations() {
        let name = format!("runtime.gc.generation.{}", generation);
        let label = format!("GC Object Count in Generation {}", generation);
        let description = format!(
            "Total number of objects in garbage collection generation {}",
            generation
        );
        let gc = gc.clone();
        // `generation` is moved in: each gauge reads its own index.
        registry.raw_gauge_callback(
            MetricInfo {
                name: &name,
                label: &label,
                description: &description,
                numerator: "objects",
            },
            move || {
                gc.generation_counts()?
                    .get(generation)
                    .copied()
                    .ok_or_else(|| format!("collector reported no generation {}", generation))
            },
        )?;
    }

    registry.raw_gauge_callback(
        MetricInfo {
            name: "runtime.gc.objects",
            label: "GC Object Count",
            description: "Total number of objects tracked by the collector",
            numerator: "objects",
        },
        move || gc.generation_counts().map(|counts| counts.iter().sum::<u64>()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricValue;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FakeThreads(AtomicU64);

    impl ThreadStats for FakeThreads {
        fn count(&self) -> Result<u64, String> {
            Ok(self.0.load(Ordering::SeqCst))
        }
    }

    struct FakeProcesses;

    impl ProcessStats for FakeProcesses {
        fn total(&self) -> Result<u64, String> {
            Ok(3)
        }

        fn active_count(&self) -> Result<u64, String> {
            Ok(2)
        }
    }

    struct FakeGc(Vec<u64>);

    impl GcStats for FakeGc {
        fn generations(&self) -> usize {
            self.0.len()
        }

        fn generation_counts(&self) -> Result<Vec<u64>, String> {
            Ok(self.0.clone())
        }
    }

    struct BrokenGc;

    impl GcStats for BrokenGc {
        fn generations(&self) -> usize {
            2
        }

        fn generation_counts(&self) -> Result<Vec<u64>, String> {
            Err("collector stats unavailable".to_string())
        }
    }

    #[test]
    fn thread_gauge_follows_the_capability() {
        let registry = Registry::new();
        let threads = Arc::new(FakeThreads(AtomicU64::new(4)));
        register_thread_metrics(&registry, threads.clone()).unwrap();

        let read = || {
            registry
                .snapshot_one("process.threads.total")
                .unwrap()
                .value
                .as_f64()
        };
        assert_eq!(read(), Some(4.0));
        threads.0.store(9, Ordering::SeqCst);
        assert_eq!(read(), Some(9.0));
    }

    #[test]
    fn process_gauges_are_registered() {
        let registry = Registry::new();
        register_process_metrics(&registry, Arc::new(FakeProcesses)).unwrap();
        let snapshot = registry.snapshot();
        assert_eq!(
            snapshot.names(),
            vec!["process.children.total", "process.children.active"]
        );
        assert_eq!(snapshot.get("process.children.total").unwrap().value.as_f64(), Some(3.0));
        assert_eq!(snapshot.get("process.children.active").unwrap().value.as_f64(), Some(2.0));
    }

    #[test]
    fn each_generation_gauge_reads_its_own_index() {
        let registry = Registry::new();
        register_gc_metrics(&registry, Arc::new(FakeGc(vec![700, 11, 3]))).unwrap();
        let snapshot = registry.snapshot();

        assert_eq!(
            snapshot.names(),
            vec![
                "runtime.gc.generation.0",
                "runtime.gc.generation.1",
                "runtime.gc.generation.2",
                "runtime.gc.objects",
            ]
        );
        let value = |name: &str| snapshot.get(name).unwrap().value.clone();
        assert_eq!(
            value("runtime.gc.generation.0"),
            MetricValue::Gauge {
                value: Some(700.0),
                raw_counter: true,
                error: None
            }
        );
        assert_eq!(value("runtime.gc.generation.1").as_f64(), Some(11.0));
        assert_eq!(value("runtime.gc.generation.2").as_f64(), Some(3.0));
        assert_eq!(value("runtime.gc.objects").as_f64(), Some(714.0));
    }

    #[test]
    fn broken_collector_only_degrades_gc_series() {
        let registry = Registry::new();
        register_gc_metrics(&registry, Arc::new(BrokenGc)).unwrap();
        register_thread_metrics(&registry, Arc::new(FakeThreads(AtomicU64::new(1)))).unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.metrics.len(), 4);
        assert!(!snapshot.get("runtime.gc.generation.0").unwrap().value.is_available());
        assert!(!snapshot.get("runtime.gc.objects").unwrap().value.is_available());
        assert_eq!(snapshot.get("process.threads.total").unwrap().value.as_f64(), Some(1.0));
    }
}
