//! Capabilities the standard catalogue samples through.
//!
//! The registry never inspects the host or a database itself; it calls these
//! narrow traits from inside gauge callbacks.

#[cfg(target_os = "linux")]
pub mod procfs_stats;

use std::sync::Arc;

#[cfg(target_os = "linux")]
pub use procfs_stats::{ProcfsProcessStats, ProcfsThreadStats};

/// Thread introspection for the current process.
pub trait ThreadStats: Send + Sync {
    fn count(&self) -> Result<u64, String>;
}

/// Introspection of the child processes spawned by the current process.
pub trait ProcessStats: Send + Sync {
    fn total(&self) -> Result<u64, String>;
    /// Children that are still running, i.e. not zombies.
    fn active_count(&self) -> Result<u64, String>;
}

/// Per-generation object counts of a generational collector.
pub trait GcStats: Send + Sync {
    /// Number of generations; fixed for the lifetime of the process.
    fn generations(&self) -> usize;
    /// Object counts ordered from the youngest generation.
    fn generation_counts(&self) -> Result<Vec<u64>, String>;
}

/// Counts entities matching a fixed predicate, e.g. all user records.
pub trait EntityCounter: Send + Sync {
    fn count(&self) -> Result<u64, String>;
}

/// The capabilities available to the standard catalogue. Missing entries
/// simply skip the corresponding metrics.
#[derive(Clone, Default)]
pub struct Introspection {
    pub threads: Option<Arc<dyn ThreadStats>>,
    pub processes: Option<Arc<dyn ProcessStats>>,
    pub gc: Option<Arc<dyn GcStats>>,
    pub users: Option<Arc<dyn EntityCounter>>,
}

impl Introspection {
    /// Host-backed capabilities: procfs on Linux, nothing elsewhere.
    ///
    /// No `GcStats` is supplied: this process has no garbage collector, so the
    /// `runtime.gc.*` series are only registered when an embedder provides one.
    pub fn host() -> Self {
        #[cfg(target_os = "linux")]
        {
            Introspection {
                threads: Some(Arc::new(ProcfsThreadStats)),
                processes: Some(Arc::new(ProcfsProcessStats)),
                ..Default::default()
            }
        }
        #[cfg(not(target_os = "linux"))]
        {
            Introspection::default()
        }
    }
}
