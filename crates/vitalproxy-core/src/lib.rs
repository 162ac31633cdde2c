//! vitalproxy core: domain records and the error surface shared by the
//! gateway and its tests.
//!
//! This crate carries no transport or runtime dependencies. It defines what a
//! patient feature record looks like on the wire, how it is wrapped for the
//! external scorer, and what a recorded call outcome (`Metric`) contains.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `VitalError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod domain;
pub mod error;

/// Shared result type.
pub use error::{Result, VitalError};
