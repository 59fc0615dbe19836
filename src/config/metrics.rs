use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Settings for the registry and the standard metric catalogue.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct MetricsConfig {
    /// Register thread and child-process gauges backed by the host (Linux only).
    #[serde(default = "default_host_introspection")]
    pub host_introspection: bool,
    /// Minimum number of seconds between two warnings for the same failing gauge.
    #[serde(default = "default_failure_log_interval_secs")]
    pub failure_log_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            host_introspection: default_host_introspection(),
            failure_log_interval_secs: default_failure_log_interval_secs(),
        }
    }
}

fn default_host_introspection() -> bool {
    true
}

fn default_failure_log_interval_secs() -> u64 {
    60
}
