//! Transactional-mail HTTP API transport (Brevo-style `POST /v3/smtp/email`).

use async_trait::async_trait;
use serde_json::{json, Value};

use vitalproxy_core::error::{Result, VitalError};

use crate::config::TemplateApiSection;

use super::{Alert, AlertTransport};

pub struct TemplateApiTransport {
    client: reqwest::Client,
    url: String,
    api_key: String,
    template_id: Option<u64>,
}

impl TemplateApiTransport {
    pub fn new(cfg: &TemplateApiSection) -> Result<Self> {
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| VitalError::Config("alert.template_api.api_key is required".into()))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| VitalError::Config(format!("alert http client: {e}")))?;
        Ok(Self {
            client,
            url: cfg.url.clone(),
            api_key,
            template_id: cfg.template_id,
        })
    }
}

/// Request body. With a template id the provider renders its stored template
/// and the inline subject/text act as parameters.
pub fn request_body(alert: &Alert, template_id: Option<u64>) -> Value {
    let mut body = json!({
        "sender": { "email": alert.from },
        "to": [ { "email": alert.to } ],
        "subject": alert.subject,
        "textContent": alert.body,
    });
    if let Some(id) = template_id {
        body["templateId"] = json!(id);
        body["params"] = json!({ "subject": alert.subject, "body": alert.body });
    }
    body
}

#[async_trait]
impl AlertTransport for TemplateApiTransport {
    fn kind(&self) -> &'static str {
        "template_api"
    }

    async fn send(&self, alert: &Alert) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&request_body(alert, self.template_id))
            .send()
            .await
            .map_err(|e| VitalError::Internal(format!("alert api request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VitalError::Internal(format!("alert api returned {status}: {body}")));
        }
        Ok(())
    }
}
