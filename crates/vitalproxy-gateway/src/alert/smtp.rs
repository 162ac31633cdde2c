//! Direct mail submission over SMTP (STARTTLS relay).

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use vitalproxy_core::error::{Result, VitalError};

use crate::config::SmtpSection;

use super::{Alert, AlertTransport};

pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(cfg: &SmtpSection) -> Result<Self> {
        let host = cfg
            .host
            .as_deref()
            .ok_or_else(|| VitalError::Config("alert.smtp.host is required".into()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| VitalError::Config(format!("alert.smtp.host: {e}")))?
            .port(cfg.port);

        if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
        })
    }
}

pub fn build_message(alert: &Alert) -> Result<Message> {
    let from: Mailbox = alert
        .from
        .parse()
        .map_err(|e| VitalError::Internal(format!("alert sender address: {e}")))?;
    let to: Mailbox = alert
        .to
        .parse()
        .map_err(|e| VitalError::Internal(format!("alert recipient address: {e}")))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(alert.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(alert.body.to_string())
        .map_err(|e| VitalError::Internal(format!("alert message: {e}")))
}

#[async_trait]
impl AlertTransport for SmtpTransport {
    fn kind(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, alert: &Alert) -> Result<()> {
        let message = build_message(alert)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| VitalError::Internal(format!("smtp send: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_requires_valid_addresses() {
        let mut alert = Alert {
            to: "ops@example.org".into(),
            from: "noreply@example.org".into(),
            subject: "s",
            body: "b",
        };
        assert!(build_message(&alert).is_ok());
        alert.to = "not an address".into();
        assert!(build_message(&alert).is_err());
    }

    #[test]
    fn missing_host_is_config_error() {
        assert!(SmtpTransport::new(&SmtpSection::default()).is_err());
    }
}
