use std::net::SocketAddr;

use axum::http::HeaderValue;
use serde::Deserialize;
use vitalproxy_core::error::{Result, VitalError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub scorer: ScorerSection,

    #[serde(default)]
    pub metrics_store: MetricsStoreSection,

    #[serde(default)]
    pub alert: AlertSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            scorer: ScorerSection::default(),
            metrics_store: MetricsStoreSection::default(),
            alert: AlertSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VitalError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.scorer.validate()?;
        self.metrics_store.validate()?;
        self.alert.validate()?;

        Ok(())
    }
}

// --------------------
// server
// --------------------
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            service_name: default_service_name(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        for origin in &self.cors_origins {
            HeaderValue::from_str(origin).map_err(|_| {
                VitalError::Config(format!("server.cors_origins has invalid origin: {origin}"))
            })?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            VitalError::Config(format!(
                "server.listen must be a valid socket address, got {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_service_name() -> String {
    "Clinical Mortality Prediction API".into()
}
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".into(),
        "http://127.0.0.1:5173".into(),
        "http://localhost:3000".into(),
    ]
}

// --------------------
// scorer
// --------------------

/// External scorer. `url`/`token` are deliberately not required here: a
/// missing URL shows up as a failed `/predict` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScorerSection {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_scorer_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ScorerSection {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_ms: default_scorer_timeout_ms(),
        }
    }
}

impl ScorerSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=300_000).contains(&self.timeout_ms) {
            return Err(VitalError::Config(
                "scorer.timeout_ms must be between 100 and 300000".into(),
            ));
        }
        Ok(())
    }
}

fn default_scorer_timeout_ms() -> u64 {
    30_000
}

// --------------------
// metrics store
// --------------------
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsStoreSection {
    /// Durable store connection string (`sqlite://<path>` or `sqlite::memory:`).
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_memory_fallback")]
    pub memory_fallback: bool,

    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

impl Default for MetricsStoreSection {
    fn default() -> Self {
        Self {
            url: None,
            memory_fallback: default_memory_fallback(),
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl MetricsStoreSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100_000).contains(&self.memory_capacity) {
            return Err(VitalError::Config(
                "metrics_store.memory_capacity must be between 1 and 100000".into(),
            ));
        }
        Ok(())
    }
}

fn default_memory_fallback() -> bool {
    true
}
fn default_memory_capacity() -> usize {
    1000
}

// --------------------
// alert
// --------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTransportKind {
    #[default]
    None,
    TemplateApi,
    Smtp,
}

impl std::str::FromStr for AlertTransportKind {
    type Err = VitalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(AlertTransportKind::None),
            "template_api" => Ok(AlertTransportKind::TemplateApi),
            "smtp" => Ok(AlertTransportKind::Smtp),
            other => Err(VitalError::Config(format!("unknown alert transport: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertSection {
    #[serde(default)]
    pub transport: AlertTransportKind,

    /// Operator address.
    #[serde(default)]
    pub to: Option<String>,

    #[serde(default)]
    pub from: Option<String>,

    #[serde(default = "default_alert_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub template_api: TemplateApiSection,

    #[serde(default)]
    pub smtp: SmtpSection,
}

impl Default for AlertSection {
    fn default() -> Self {
        Self {
            transport: AlertTransportKind::None,
            to: None,
            from: None,
            timeout_ms: default_alert_timeout_ms(),
            template_api: TemplateApiSection::default(),
            smtp: SmtpSection::default(),
        }
    }
}

impl AlertSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60_000).contains(&self.timeout_ms) {
            return Err(VitalError::Config(
                "alert.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if self.transport == AlertTransportKind::None {
            return Ok(());
        }
        if self.to.is_none() || self.from.is_none() {
            return Err(VitalError::Config(
                "alert.to and alert.from are required when alerting is enabled".into(),
            ));
        }
        match self.transport {
            AlertTransportKind::TemplateApi if self.template_api.api_key.is_none() => Err(
                VitalError::Config("alert.template_api.api_key is required".into()),
            ),
            AlertTransportKind::Smtp if self.smtp.host.is_none() => {
                Err(VitalError::Config("alert.smtp.host is required".into()))
            }
            _ => Ok(()),
        }
    }
}

fn default_alert_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateApiSection {
    #[serde(default = "default_template_api_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub template_id: Option<u64>,
}

impl Default for TemplateApiSection {
    fn default() -> Self {
        Self {
            url: default_template_api_url(),
            api_key: None,
            template_id: None,
        }
    }
}

fn default_template_api_url() -> String {
    "https://api.brevo.com/v3/smtp/email".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpSection {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl Default for SmtpSection {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            username: None,
            password: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}
