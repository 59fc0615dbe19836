//! The standard set of metrics this service registers at startup.

mod auth;
mod process;
mod requests;
mod users;

pub use auth::{AuthBackend, AuthTimers};
pub use process::{register_gc_metrics, register_process_metrics, register_thread_metrics};
pub use requests::RequestMetrics;
pub use users::register_user_count;

use tracing::info;

use crate::introspection::Introspection;
use crate::metrics::{MetricsError, Registry};

/// Handles to the standard metrics that call sites mutate.
#[derive(Clone)]
pub struct StandardMetrics {
    pub requests: RequestMetrics,
    pub auth: AuthTimers,
}

/// Registers the standard catalogue. Introspection-backed gauges are only
/// registered for the capabilities that are present.
pub fn register_standard_metrics(
    registry: &Registry,
    introspection: &Introspection,
) -> Result<StandardMetrics, MetricsError> {
    if let Some(threads) = &introspection.threads {
        register_thread_metrics(registry, threads.clone())?;
    }
    if let Some(processes) = &introspection.processes {
        register_process_metrics(registry, processes.clone())?;
    }
    if let Some(gc) = &introspection.gc {
        register_gc_metrics(registry, gc.clone())?;
    }

    let requests = RequestMetrics::register(registry)?;

    if let Some(users) = &introspection.users {
        register_user_count(registry, users.clone())?;
    }

    let auth = AuthTimers::register(registry)?;

    info!(
        event_name = "metrics.catalog.registered",
        event_domain = "metrics",
        metric_count = registry.len(),
        "registered standard metrics"
    );

    Ok(StandardMetrics { requests, auth })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::EntityCounter;
    use std::sync::Arc;

    struct NoUsers;

    impl EntityCounter for NoUsers {
        fn count(&self) -> Result<u64, String> {
            Ok(0)
        }
    }

    #[test]
    fn registers_request_and_auth_metrics_without_introspection() {
        let registry = Registry::new();
        register_standard_metrics(&registry, &Introspection::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "requests.active",
                "requests.exceptions",
                "requests.response-time",
                "ldap.authentication-time",
                "auth.oauth.authentication-time",
                "auth.pam.authentication-time",
                "auth.spnego.authentication-time",
            ]
        );
    }

    #[test]
    fn registers_user_gauge_when_available() {
        let registry = Registry::new();
        let introspection = Introspection {
            users: Some(Arc::new(NoUsers)),
            ..Default::default()
        };
        register_standard_metrics(&registry, &introspection).unwrap();
        assert!(registry.get("users").is_some());
    }

    #[test]
    fn host_introspection_has_no_gc_series() {
        let introspection = Introspection::host();
        assert!(introspection.gc.is_none());

        let registry = Registry::new();
        register_standard_metrics(&registry, &introspection).unwrap();
        assert!(registry.names().iter().all(|n| !n.starts_with("runtime.gc.")));
    }

    #[test]
    fn registering_twice_is_a_conflict() {
        let registry = Registry::new();
        register_standard_metrics(&registry, &Introspection::default()).unwrap();
        let err = match register_standard_metrics(&registry, &Introspection::default()) {
            Err(e) => e,
            Ok(_) => panic!("second registration should fail"),
        };
        assert!(matches!(err, MetricsError::DescriptorConflict { name, .. } if name == "requests.active"));
    }
}
