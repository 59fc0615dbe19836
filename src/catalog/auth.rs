use std::future::Future;
use std::sync::Arc;

use crate::metrics::{MetricInfo, MetricsError, RateUnit, Registry, Timer, TimerContext};

/// Authentication backends whose calls are timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthBackend {
    Ldap,
    OAuth,
    Pam,
    Spnego,
}

impl AuthBackend {
    pub const ALL: [AuthBackend; 4] = [
        AuthBackend::Ldap,
        AuthBackend::OAuth,
        AuthBackend::Pam,
        AuthBackend::Spnego,
    ];

    fn metric_name(&self) -> &'static str {
        match self {
            AuthBackend::Ldap => "ldap.authentication-time",
            AuthBackend::OAuth => "auth.oauth.authentication-time",
            AuthBackend::Pam => "auth.pam.authentication-time",
            AuthBackend::Spnego => "auth.spnego.authentication-time",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            AuthBackend::Ldap => "LDAP",
            AuthBackend::OAuth => "OAUTH",
            AuthBackend::Pam => "PAM",
            AuthBackend::Spnego => "SPNEGO",
        }
    }
}

/// One timer per authentication backend. Call sites bracket the backend
/// call so failed authentications are timed too.
#[derive(Clone)]
pub struct AuthTimers {
    ldap: Arc<Timer>,
    oauth: Arc<Timer>,
    pam: Arc<Timer>,
    spnego: Arc<Timer>,
}

impl AuthTimers {
    pub fn register(registry: &Registry) -> Result<Self, MetricsError> {
        let register = |backend: AuthBackend| {
            let label = format!("{} Authentication Time", backend.display_name());
            let description = format!(
                "The time spent waiting for {} to authenticate a user over the life of the process",
                backend.display_name()
            );
            registry.timer(
                MetricInfo {
                    name: backend.metric_name(),
                    label: &label,
                    description: &description,
                    numerator: "seconds",
                },
                "authentications",
                RateUnit::Seconds,
            )
        };

        Ok(AuthTimers {
            ldap: register(AuthBackend::Ldap)?,
            oauth: register(AuthBackend::OAuth)?,
            pam: register(AuthBackend::Pam)?,
            spnego: register(AuthBackend::Spnego)?,
        })
    }

    pub fn timer(&self, backend: AuthBackend) -> &Arc<Timer> {
        match backend {
            AuthBackend::Ldap => &self.ldap,
            AuthBackend::OAuth => &self.oauth,
            AuthBackend::Pam => &self.pam,
            AuthBackend::Spnego => &self.spnego,
        }
    }

    pub fn start(&self, backend: AuthBackend) -> TimerContext {
        self.timer(backend).start()
    }

    /// Times an authentication future, whatever its outcome.
    pub async fn time<F: Future>(&self, backend: AuthBackend, authenticate: F) -> F::Output {
        self.timer(backend).time_async(authenticate).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricValue;
    use std::time::Duration;

    #[test]
    fn registers_one_timer_per_backend() {
        let registry = Registry::new();
        AuthTimers::register(&registry).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "ldap.authentication-time",
                "auth.oauth.authentication-time",
                "auth.pam.authentication-time",
                "auth.spnego.authentication-time",
            ]
        );

        let snapshot = registry.snapshot();
        let pam = snapshot.get("auth.pam.authentication-time").unwrap();
        assert_eq!(pam.descriptor.label(), "PAM Authentication Time");
        assert!(matches!(
            &pam.value,
            MetricValue::Timer { counter_numerator, .. } if counter_numerator == "authentications"
        ));
    }

    #[tokio::test]
    async fn failed_authentications_are_timed() {
        let registry = Registry::new();
        let timers = AuthTimers::register(&registry).unwrap();

        let result: Result<(), String> = timers
            .time(AuthBackend::Ldap, async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Err("invalid credentials".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(timers.timer(AuthBackend::Ldap).count(), 1);
        for backend in [AuthBackend::OAuth, AuthBackend::Pam, AuthBackend::Spnego] {
            assert_eq!(timers.timer(backend).count(), 0);
        }
    }

    #[test]
    fn explicit_start_and_stop() {
        let registry = Registry::new();
        let timers = AuthTimers::register(&registry).unwrap();
        for backend in AuthBackend::ALL {
            timers.start(backend).stop();
        }
        for backend in AuthBackend::ALL {
            assert_eq!(timers.timer(backend).counter_value(), 1);
        }
    }
}
