//! Lightweight in-process counters (dependency-light).
//!
//! Exposed in Prometheus text format at `/ops/metrics`. These are separate
//! from the recorded call metrics served at `/metrics`.

pub mod metrics;

pub use metrics::GatewayMetrics;
