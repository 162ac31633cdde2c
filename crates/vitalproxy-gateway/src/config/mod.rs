//! Gateway config loader (strict YAML, then environment overrides).

pub mod schema;

use std::fs;
use std::path::Path;

use vitalproxy_core::error::{Result, VitalError};

pub use schema::{
    AlertSection, AlertTransportKind, GatewayConfig, MetricsStoreSection, ScorerSection,
    ServerSection, SmtpSection, TemplateApiSection,
};

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "VITALPROXY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "vitalproxy.yaml";

/// Load process config: file (explicit, conventional, or built-in defaults),
/// then process environment overrides.
pub fn load() -> Result<GatewayConfig> {
    let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_from_file(&path)?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from_file(DEFAULT_CONFIG_PATH)?,
        Err(_) => GatewayConfig::default(),
    };
    apply_env(&mut cfg, |k| std::env::var(k).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| VitalError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| VitalError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Apply environment overrides. `lookup` is injected so tests never touch the
/// real process environment. Empty values count as unset.
pub fn apply_env<F>(cfg: &mut GatewayConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("VITALPROXY_LISTEN") {
        cfg.server.listen = v;
    }
    if let Some(v) = get("SERVICE_NAME") {
        cfg.server.service_name = v;
    }
    if let Some(v) = get("CORS_ORIGINS") {
        cfg.server.cors_origins = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(v) = get("SCORER_API_URL") {
        cfg.scorer.url = Some(v);
    }
    if let Some(v) = get("SCORER_API_TOKEN") {
        cfg.scorer.token = Some(v);
    }
    if let Some(v) = get("SCORER_TIMEOUT_MS") {
        cfg.scorer.timeout_ms = parse_num("SCORER_TIMEOUT_MS", &v)?;
    }

    if let Some(v) = get("METRICS_STORE_URL") {
        cfg.metrics_store.url = Some(v);
    }
    if let Some(v) = get("METRICS_MEMORY_FALLBACK") {
        cfg.metrics_store.memory_fallback = parse_flag("METRICS_MEMORY_FALLBACK", &v)?;
    }
    if let Some(v) = get("METRICS_MEMORY_CAPACITY") {
        cfg.metrics_store.memory_capacity = parse_num("METRICS_MEMORY_CAPACITY", &v)?;
    }

    if let Some(v) = get("ALERT_TRANSPORT") {
        cfg.alert.transport = v.parse()?;
    }
    if let Some(v) = get("ALERT_EMAIL_TO") {
        cfg.alert.to = Some(v);
    }
    if let Some(v) = get("ALERT_EMAIL_FROM") {
        cfg.alert.from = Some(v);
    }
    if let Some(v) = get("ALERT_API_URL") {
        cfg.alert.template_api.url = v;
    }
    if let Some(v) = get("ALERT_API_KEY") {
        cfg.alert.template_api.api_key = Some(v);
    }
    if let Some(v) = get("ALERT_TEMPLATE_ID") {
        cfg.alert.template_api.template_id = Some(parse_num("ALERT_TEMPLATE_ID", &v)?);
    }
    if let Some(v) = get("ALERT_SMTP_HOST") {
        cfg.alert.smtp.host = Some(v);
    }
    if let Some(v) = get("ALERT_SMTP_PORT") {
        cfg.alert.smtp.port = parse_num("ALERT_SMTP_PORT", &v)?;
    }
    if let Some(v) = get("ALERT_SMTP_USERNAME") {
        cfg.alert.smtp.username = Some(v);
    }
    if let Some(v) = get("ALERT_SMTP_PASSWORD") {
        cfg.alert.smtp.password = Some(v);
    }

    Ok(())
}

fn parse_num<T: std::str::FromStr>(key: &str, v: &str) -> Result<T> {
    v.trim()
        .parse()
        .map_err(|_| VitalError::Config(format!("{key} must be a number, got {v}")))
}

fn parse_flag(key: &str, v: &str) -> Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(VitalError::Config(format!("{key} must be a boolean, got {v}"))),
    }
}
