//! Domain records.
//!
//! - `patient`: the per-request feature record and the scorer payload built from it
//! - `metric`: one recorded proxy-call outcome

pub mod metric;
pub mod patient;

pub use metric::{sort_newest_first, Metric, MetricStatus};
pub use patient::{PatientFeatures, ScoringFeatures, ScoringRequestPayload};
