use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VitalError};

/// Outcome tag of one proxy call. The wire strings are part of the public API
/// (dashboards filter on them), so they are pinned explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "API Error")]
    ApiError,
    #[serde(rename = "Internal Server Error")]
    InternalServerError,
}

impl MetricStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricStatus::Success => "success",
            MetricStatus::ApiError => "API Error",
            MetricStatus::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricStatus {
    type Err = VitalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(MetricStatus::Success),
            "API Error" => Ok(MetricStatus::ApiError),
            "Internal Server Error" => Ok(MetricStatus::InternalServerError),
            other => Err(VitalError::Validation(format!("unknown metric status: {other}"))),
        }
    }
}

/// Timestamps outside this range have no fixed-width RFC 3339 form.
const TIMESTAMP_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// One recorded proxy-call outcome. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub status: MetricStatus,
    /// Wall-clock seconds.
    pub latency: f64,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    /// Metric stamped with the current time.
    pub fn new(status: MetricStatus, elapsed: Duration) -> Self {
        Self {
            status,
            latency: elapsed.as_secs_f64(),
            timestamp: Utc::now(),
        }
    }

    /// Reject records a client could submit but the recorder must never hold.
    pub fn validate(&self) -> Result<()> {
        if !self.latency.is_finite() || self.latency < 0.0 {
            return Err(VitalError::Validation(format!(
                "latency must be a non-negative number of seconds, got {}",
                self.latency
            )));
        }
        if !TIMESTAMP_YEARS.contains(&self.timestamp.year()) {
            return Err(VitalError::Validation(format!(
                "timestamp year must be within 0000..=9999, got {}",
                self.timestamp.year()
            )));
        }
        Ok(())
    }
}

/// Sort descending by timestamp. Stable, so callers that pass entries
/// newest-inserted first keep that order among equal timestamps.
pub fn sort_newest_first(metrics: &mut [Metric]) {
    metrics.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64, status: MetricStatus) -> Metric {
        Metric {
            status,
            latency: 0.5,
            timestamp: Utc.timestamp_opt(secs, 0).single().unwrap_or_default(),
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in [
            MetricStatus::Success,
            MetricStatus::ApiError,
            MetricStatus::InternalServerError,
        ] {
            assert_eq!(s.as_str().parse::<MetricStatus>().ok(), Some(s));
        }
        assert!("timeout".parse::<MetricStatus>().is_err());
    }

    #[test]
    fn sort_is_newest_first_and_stable() {
        let mut v = vec![
            at(10, MetricStatus::Success),
            at(30, MetricStatus::ApiError),
            at(20, MetricStatus::Success),
            at(30, MetricStatus::InternalServerError),
        ];
        sort_newest_first(&mut v);
        let secs: Vec<i64> = v.iter().map(|m| m.timestamp.timestamp()).collect();
        assert_eq!(secs, vec![30, 30, 20, 10]);
        assert_eq!(v[0].status, MetricStatus::ApiError);
        assert_eq!(v[1].status, MetricStatus::InternalServerError);
    }

    #[test]
    fn negative_latency_rejected() {
        let mut m = at(1, MetricStatus::Success);
        m.latency = -0.1;
        assert!(m.validate().is_err());
        m.latency = f64::NAN;
        assert!(m.validate().is_err());
        m.latency = 0.0;
        assert!(m.validate().is_ok());
    }

    #[test]
    fn timestamps_outside_four_digit_years_rejected() {
        let mut m = at(1, MetricStatus::Success);
        m.timestamp = Utc
            .with_ymd_and_hms(10_000, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        assert_eq!(m.timestamp.year(), 10_000);
        assert!(matches!(m.validate(), Err(VitalError::Validation(_))));

        m.timestamp = Utc
            .with_ymd_and_hms(-1, 6, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        assert!(m.validate().is_err());

        m.timestamp = Utc
            .with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
            .single()
            .unwrap_or_default();
        assert!(m.validate().is_ok());
    }
}
