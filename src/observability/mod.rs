//! # Observability
//!
//! - `metrics`: Prometheus metrics collection
//! - `reporter`: periodic publication of state gauges

pub mod metrics;
pub mod reporter;

pub use reporter::StateReporter;
