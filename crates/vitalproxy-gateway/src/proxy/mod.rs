//! Scoring Proxy: forwards a patient record to the external scorer and hands
//! back its JSON body untouched.
//!
//! One POST per call, bounded by the configured timeout, no retries. Every
//! call produces exactly one metric through `MetricGuard`; scorer failures
//! also trigger the Alert Notifier.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::value::RawValue;

use vitalproxy_core::domain::{MetricStatus, PatientFeatures};
use vitalproxy_core::error::{Result, VitalError};

use crate::alert::AlertNotifier;
use crate::config::ScorerSection;
use crate::obs::GatewayMetrics;
use crate::recorder::{MetricGuard, MetricsRecorder};

pub struct ScoringProxy {
    client: reqwest::Client,
    url: Option<String>,
    token: Option<String>,
    recorder: Arc<MetricsRecorder>,
    alerts: Arc<AlertNotifier>,
    obs: Arc<GatewayMetrics>,
}

impl ScoringProxy {
    pub fn new(
        cfg: &ScorerSection,
        recorder: Arc<MetricsRecorder>,
        alerts: Arc<AlertNotifier>,
        obs: Arc<GatewayMetrics>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| VitalError::Config(format!("scorer http client: {e}")))?;

        if cfg.url.is_none() {
            tracing::warn!("scorer url not configured; /predict will fail until it is set");
        }

        Ok(Self {
            client,
            url: cfg.url.clone(),
            token: cfg.token.clone(),
            recorder,
            alerts,
            obs,
        })
    }

    /// Forward one record. Returns the scorer's 2xx body byte-for-byte.
    pub async fn predict(&self, features: PatientFeatures) -> Result<Bytes> {
        let guard = MetricGuard::start(Arc::clone(&self.recorder));
        let in_flight = self.obs.predict_in_flight.track(&[]);

        let outcome = self.call_scorer(&features).await;
        let status = outcome_status(&outcome);

        drop(in_flight);
        self.obs.predict_requests.inc(&[("status", status.as_str())]);
        self.obs
            .scorer_latency
            .observe(&[("status", status.as_str())], guard.elapsed());

        if let Err(e) = &outcome {
            tracing::warn!(error = %e, status = %status, "prediction failed");
            if matches!(e, VitalError::Upstream(_)) {
                self.alerts.notify_failure().await;
            }
        }

        guard.finish(status).await;
        outcome
    }

    async fn call_scorer(&self, features: &PatientFeatures) -> Result<Bytes> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| VitalError::Upstream("scorer url is not configured".into()))?;

        let mut req = self.client.post(url).json(&features.to_scoring_payload());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| VitalError::Upstream(describe_transport_error(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VitalError::Upstream(format!(
                "scorer returned {status} for url {}",
                resp.url()
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| VitalError::Upstream(describe_transport_error(&e)))?;

        // Validate without re-serializing so the caller gets the exact bytes.
        serde_json::from_slice::<&RawValue>(&body)
            .map_err(|e| VitalError::Internal(format!("scorer response is not valid JSON: {e}")))?;

        Ok(body)
    }
}

fn outcome_status<T>(outcome: &Result<T>) -> MetricStatus {
    match outcome {
        Ok(_) => MetricStatus::Success,
        Err(VitalError::Upstream(_)) => MetricStatus::ApiError,
        Err(_) => MetricStatus::InternalServerError,
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_follow_error_class() {
        let ok: Result<()> = Ok(());
        assert_eq!(outcome_status(&ok), MetricStatus::Success);
        let up: Result<()> = Err(VitalError::Upstream("503".into()));
        assert_eq!(outcome_status(&up), MetricStatus::ApiError);
        let internal: Result<()> = Err(VitalError::Internal("bad json".into()));
        assert_eq!(outcome_status(&internal), MetricStatus::InternalServerError);
    }
}
