//! vitalproxy gateway library entry.
//!
//! This crate wires config, the Scoring Proxy, the Metrics Recorder and the
//! Alert Notifier into an axum service. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod alert;
pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod proxy;
pub mod recorder;
pub mod router;
pub mod server;
