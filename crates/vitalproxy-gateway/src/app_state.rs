//! Shared application state for the vitalproxy gateway.
//!
//! Built once at startup: the metrics store tier is probed here and then held
//! for the process lifetime. Startup errors are returned, not panicked.

use std::sync::Arc;

use vitalproxy_core::error::Result;

use crate::alert::AlertNotifier;
use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::proxy::ScoringProxy;
use crate::recorder::MetricsRecorder;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    proxy: Arc<ScoringProxy>,
    recorder: Arc<MetricsRecorder>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build application state, probing the durable metrics store.
    pub async fn new(cfg: GatewayConfig) -> Result<Self> {
        let metrics = Arc::new(GatewayMetrics::default());

        // 1) Metrics store cascade (durable -> memory -> disabled)
        let recorder = Arc::new(
            MetricsRecorder::connect(&cfg.metrics_store, Arc::clone(&metrics)).await,
        );

        // 2) Alert transport
        let alerts = Arc::new(AlertNotifier::from_config(&cfg.alert, Arc::clone(&metrics))?);

        // 3) Scorer client
        let proxy = Arc::new(ScoringProxy::new(
            &cfg.scorer,
            Arc::clone(&recorder),
            alerts,
            Arc::clone(&metrics),
        )?);

        Ok(Self::from_parts(cfg, proxy, recorder, metrics))
    }

    /// Assemble from prebuilt components (tests inject their own store/alerts).
    pub fn from_parts(
        cfg: GatewayConfig,
        proxy: Arc<ScoringProxy>,
        recorder: Arc<MetricsRecorder>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            proxy,
            recorder,
            metrics,
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn proxy(&self) -> Arc<ScoringProxy> {
        Arc::clone(&self.proxy)
    }

    pub fn recorder(&self) -> Arc<MetricsRecorder> {
        Arc::clone(&self.recorder)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }
}
