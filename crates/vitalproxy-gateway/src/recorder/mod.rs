//! Metrics Recorder: persists proxy-call outcomes through the selected store
//! tier and serves them newest-first.
//!
//! Two write paths:
//! - `record`: used by the proxy. Never fails observably; problems are logged.
//! - `try_record`: used by `POST /metrics`. Surfaces `StoreUnavailable` when
//!   no tier is active.

pub mod memory;
pub mod sqlite;
pub mod store;

use std::sync::Arc;
use std::time::{Duration, Instant};

use vitalproxy_core::domain::{Metric, MetricStatus};
use vitalproxy_core::error::{Result, VitalError};

use crate::config::MetricsStoreSection;
use crate::obs::GatewayMetrics;

pub use memory::MemoryMetricStore;
pub use sqlite::SqliteMetricStore;
pub use store::{MetricStore, StoreTier};

pub struct MetricsRecorder {
    store: MetricStore,
    obs: Arc<GatewayMetrics>,
}

impl MetricsRecorder {
    /// Run the storage cascade and wrap the chosen tier.
    pub async fn connect(cfg: &MetricsStoreSection, obs: Arc<GatewayMetrics>) -> Self {
        let store = MetricStore::select(cfg).await;
        Self::with_store(store, obs)
    }

    pub fn with_store(store: MetricStore, obs: Arc<GatewayMetrics>) -> Self {
        obs.metric_store_tier.set(&[("tier", store.tier().as_str())], 1);
        Self { store, obs }
    }

    pub fn tier(&self) -> StoreTier {
        self.store.tier()
    }

    /// Best-effort write. Never returns an error.
    pub async fn record(&self, metric: Metric) {
        let tier = self.tier().as_str();
        let status = metric.status;
        let latency = metric.latency;

        match self.store.insert(metric).await {
            Ok(()) => {
                self.obs.metric_writes.inc(&[("tier", tier), ("outcome", "ok")]);
            }
            Err(VitalError::StoreUnavailable) => {
                self.obs.metric_writes.inc(&[("tier", tier), ("outcome", "logged")]);
                tracing::info!(status = %status, latency, "metric not persisted (no store)");
            }
            Err(e) => {
                self.obs.metric_writes.inc(&[("tier", tier), ("outcome", "failed")]);
                tracing::warn!(status = %status, latency, error = %e, "metric write failed");
            }
        }
    }

    /// Validated write for direct submissions.
    pub async fn try_record(&self, metric: Metric) -> Result<()> {
        metric.validate()?;
        let tier = self.tier().as_str();
        let res = self.store.insert(metric).await;
        let outcome = if res.is_ok() { "ok" } else { "rejected" };
        self.obs.metric_writes.inc(&[("tier", tier), ("outcome", outcome)]);
        res
    }

    /// Newest first. Read failures are logged and yield an empty list.
    pub async fn list(&self) -> Vec<Metric> {
        match self.store.list().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "metric read failed");
                Vec::new()
            }
        }
    }
}

/// Records exactly one metric per proxy call.
///
/// Normal exits call `finish` with the real outcome. If the guard is dropped
/// unfinished (panic or cancellation) it records `Internal Server Error` on a
/// detached task.
pub struct MetricGuard {
    recorder: Arc<MetricsRecorder>,
    started: Instant,
    armed: bool,
}

impl MetricGuard {
    pub fn start(recorder: Arc<MetricsRecorder>) -> Self {
        Self {
            recorder,
            started: Instant::now(),
            armed: true,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub async fn finish(mut self, status: MetricStatus) {
        self.armed = false;
        let metric = Metric::new(status, self.elapsed());
        self.recorder.record(metric).await;
    }
}

impl Drop for MetricGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let metric = Metric::new(MetricStatus::InternalServerError, self.elapsed());
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let recorder = Arc::clone(&self.recorder);
                handle.spawn(async move { recorder.record(metric).await });
            }
            Err(_) => {
                tracing::warn!(latency = metric.latency, "metric dropped: no runtime to record it");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_recorder() -> Arc<MetricsRecorder> {
        Arc::new(MetricsRecorder::with_store(
            MetricStore::Memory(MemoryMetricStore::new(10)),
            Arc::new(GatewayMetrics::default()),
        ))
    }

    #[tokio::test]
    async fn finished_guard_records_once_with_status() {
        let rec = memory_recorder();
        let guard = MetricGuard::start(Arc::clone(&rec));
        guard.finish(MetricStatus::ApiError).await;

        let listed = rec.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, MetricStatus::ApiError);
        assert!(listed[0].latency >= 0.0);
    }

    #[tokio::test]
    async fn dropped_guard_records_internal_error() {
        let rec = memory_recorder();
        drop(MetricGuard::start(Arc::clone(&rec)));

        for _ in 0..50 {
            if !rec.list().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let listed = rec.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, MetricStatus::InternalServerError);
    }

    #[tokio::test]
    async fn panicking_task_still_records() {
        let rec = memory_recorder();
        let r = Arc::clone(&rec);
        let handle = tokio::spawn(async move {
            let _guard = MetricGuard::start(r);
            panic!("scorer client bug");
        });
        assert!(handle.await.is_err());

        for _ in 0..50 {
            if !rec.list().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(rec.list().await[0].status, MetricStatus::InternalServerError);
    }

    #[tokio::test]
    async fn disabled_store_record_is_silent_but_try_record_fails() {
        let obs = Arc::new(GatewayMetrics::default());
        let rec = MetricsRecorder::with_store(MetricStore::Disabled, Arc::clone(&obs));
        let m = Metric::new(MetricStatus::Success, Duration::from_millis(1));

        rec.record(m.clone()).await;
        assert_eq!(
            obs.metric_writes.get(&[("tier", "disabled"), ("outcome", "logged")]),
            1
        );
        assert!(matches!(rec.try_record(m).await, Err(VitalError::StoreUnavailable)));
        assert!(rec.list().await.is_empty());
    }

    #[tokio::test]
    async fn try_record_validates_latency() {
        let rec = memory_recorder();
        let mut m = Metric::new(MetricStatus::Success, Duration::from_millis(1));
        m.latency = -1.0;
        assert!(matches!(rec.try_record(m).await, Err(VitalError::Validation(_))));
        assert!(rec.list().await.is_empty());
    }
}
