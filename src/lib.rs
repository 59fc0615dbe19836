//! Library exports for metricsd, shared between the binary and tests.

pub mod catalog;
pub mod config;
pub mod introspection;
pub mod metrics;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;
