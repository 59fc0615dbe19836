use std::sync::Arc;

use crate::introspection::EntityCounter;
use crate::metrics::{MetricInfo, MetricsError, Registry};

pub fn register_user_count(
    registry: &Registry,
    users: Arc<dyn EntityCounter>,
) -> Result<(), MetricsError> {
    registry.gauge_callback(
        MetricInfo {
            name: "users",
            label: "Users",
            description: "Total number of user accounts",
            numerator: "users",
        },
        move || users.count(),
    )
}
