//! Alert Notifier: one fixed operator notification when the scorer fails.
//!
//! Best-effort. Transport errors and timeouts are logged and counted, never
//! returned; the caller's `ScoringUnavailable` response does not depend on
//! whether the alert went out.

pub mod smtp;
pub mod template_api;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vitalproxy_core::error::{Result, VitalError};

use crate::config::{AlertSection, AlertTransportKind};
use crate::obs::GatewayMetrics;

pub use smtp::SmtpTransport;
pub use template_api::TemplateApiTransport;

pub const ALERT_SUBJECT: &str = "Clinical Mortality API alert: scoring service unavailable";
pub const ALERT_BODY: &str = "The mortality scoring service could not be reached or returned an error. \
Predictions are failing until it recovers. Check the gateway logs for the upstream error.";

/// A fully addressed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub to: String,
    pub from: String,
    pub subject: &'static str,
    pub body: &'static str,
}

/// Delivery channel for alerts.
#[async_trait]
pub trait AlertTransport: Send + Sync {
    fn kind(&self) -> &'static str;
    async fn send(&self, alert: &Alert) -> Result<()>;
}

pub struct AlertNotifier {
    transport: Option<Arc<dyn AlertTransport>>,
    to: String,
    from: String,
    timeout: Duration,
    obs: Arc<GatewayMetrics>,
}

impl AlertNotifier {
    /// Build the configured transport. `AlertTransportKind::None` disables alerts.
    pub fn from_config(cfg: &AlertSection, obs: Arc<GatewayMetrics>) -> Result<Self> {
        let transport: Option<Arc<dyn AlertTransport>> = match cfg.transport {
            AlertTransportKind::None => None,
            AlertTransportKind::TemplateApi => {
                Some(Arc::new(TemplateApiTransport::new(&cfg.template_api)?))
            }
            AlertTransportKind::Smtp => Some(Arc::new(SmtpTransport::new(&cfg.smtp)?)),
        };
        if transport.is_none() {
            tracing::info!("alerting disabled");
        }

        Ok(Self {
            transport,
            to: cfg.to.clone().unwrap_or_default(),
            from: cfg.from.clone().unwrap_or_default(),
            timeout: Duration::from_millis(cfg.timeout_ms),
            obs,
        })
    }

    pub fn with_transport(
        transport: Arc<dyn AlertTransport>,
        to: impl Into<String>,
        from: impl Into<String>,
        timeout: Duration,
        obs: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            transport: Some(transport),
            to: to.into(),
            from: from.into(),
            timeout,
            obs,
        }
    }

    pub fn disabled(obs: Arc<GatewayMetrics>) -> Self {
        Self {
            transport: None,
            to: String::new(),
            from: String::new(),
            timeout: Duration::from_secs(10),
            obs,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    fn alert(&self) -> Alert {
        Alert {
            to: self.to.clone(),
            from: self.from.clone(),
            subject: ALERT_SUBJECT,
            body: ALERT_BODY,
        }
    }

    /// Send the fixed failure notification. Never fails.
    pub async fn notify_failure(&self) {
        let Some(transport) = &self.transport else {
            self.obs.alerts.inc(&[("outcome", "disabled")]);
            return;
        };

        let alert = self.alert();
        let res = match tokio::time::timeout(self.timeout, transport.send(&alert)).await {
            Ok(res) => res,
            Err(_) => Err(VitalError::Internal(format!(
                "alert timed out after {}ms",
                self.timeout.as_millis()
            ))),
        };

        match res {
            Ok(()) => {
                self.obs.alerts.inc(&[("outcome", "sent")]);
                tracing::info!(transport = transport.kind(), to = %alert.to, "failure alert sent");
            }
            Err(e) => {
                self.obs.alerts.inc(&[("outcome", "failed")]);
                tracing::warn!(transport = transport.kind(), error = %e, "failure alert not sent");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        sent: Mutex<Vec<Alert>>,
        fail: bool,
        stall: bool,
    }

    #[async_trait]
    impl AlertTransport for Capture {
        fn kind(&self) -> &'static str {
            "capture"
        }

        async fn send(&self, alert: &Alert) -> Result<()> {
            if self.stall {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if self.fail {
                return Err(VitalError::Internal("auth failed".into()));
            }
            self.sent.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    fn notifier(t: Arc<Capture>, obs: Arc<GatewayMetrics>) -> AlertNotifier {
        AlertNotifier::with_transport(t, "ops@example.org", "noreply@example.org", Duration::from_millis(200), obs)
    }

    #[tokio::test]
    async fn sends_fixed_content() {
        let t = Arc::new(Capture::default());
        let obs = Arc::new(GatewayMetrics::default());
        notifier(Arc::clone(&t), Arc::clone(&obs)).notify_failure().await;

        let sent = t.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, ALERT_SUBJECT);
        assert_eq!(sent[0].to, "ops@example.org");
        assert_eq!(obs.alerts.get(&[("outcome", "sent")]), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_swallowed() {
        let t = Arc::new(Capture { fail: true, ..Default::default() });
        let obs = Arc::new(GatewayMetrics::default());
        notifier(t, Arc::clone(&obs)).notify_failure().await;
        assert_eq!(obs.alerts.get(&[("outcome", "failed")]), 1);
    }

    #[tokio::test]
    async fn slow_transport_is_cut_off() {
        let t = Arc::new(Capture { stall: true, ..Default::default() });
        let obs = Arc::new(GatewayMetrics::default());
        let started = std::time::Instant::now();
        notifier(t, Arc::clone(&obs)).notify_failure().await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(obs.alerts.get(&[("outcome", "failed")]), 1);
    }

    #[tokio::test]
    async fn disabled_notifier_counts_and_returns() {
        let obs = Arc::new(GatewayMetrics::default());
        let n = AlertNotifier::from_config(&AlertSection::default(), Arc::clone(&obs)).unwrap();
        assert!(!n.is_enabled());
        n.notify_failure().await;
        assert_eq!(obs.alerts.get(&[("outcome", "disabled")]), 1);
    }
}
