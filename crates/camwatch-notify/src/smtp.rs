//! SMTP notification channel.
//!
//! Sends each alert as an HTML email through a mail relay, upgrading the
//! connection with STARTTLS and logging in before delivery.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::channel::NotificationChannel;
use crate::error::TransportError;

/// Relay connection and addressing for [`SmtpChannel`].
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub login: String,
    pub password: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub timeout: Duration,
}

/// Emails alerts to a fixed recipient list.
pub struct SmtpChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    timeout: Duration,
}

impl SmtpChannel {
    /// Parse addresses and prepare the relay. No connection is made yet.
    pub fn new(settings: SmtpSettings) -> Result<Self, TransportError> {
        let from = parse_mailbox(&settings.sender)?;
        let to = settings
            .recipients
            .iter()
            .map(|r| parse_mailbox(r))
            .collect::<Result<Vec<_>, _>>()?;
        if to.is_empty() {
            return Err(TransportError::InvalidDestination(
                "no recipients configured".to_string(),
            ));
        }

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
            .map_err(|e| TransportError::InvalidDestination(format!("{}: {e}", settings.server)))?
            .port(settings.port)
            .credentials(Credentials::new(settings.login, settings.password))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            timeout: settings.timeout,
        })
    }

    /// Build the HTML email for one alert.
    pub fn message(&self, subject: &str, html_body: &str) -> Result<Message, TransportError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }
        builder
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .trim()
        .parse()
        .map_err(|e| TransportError::InvalidDestination(format!("{address}: {e}")))
}

#[async_trait]
impl NotificationChannel for SmtpChannel {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, subject: &str, html_body: &str) -> Result<(), TransportError> {
        let message = self.message(subject, html_body)?;

        tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
            .map_err(|e| TransportError::Request(e.to_string()))?;

        debug!(recipients = self.to.len(), "alert mailed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            server: "smtp.example.com".to_string(),
            port: 587,
            login: "cams@example.com".to_string(),
            password: "secret".to_string(),
            sender: "Camera Monitor <cams@example.com>".to_string(),
            recipients: vec!["ops@example.com".to_string(), "guard@example.com".to_string()],
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn message_is_html_to_every_recipient() {
        let channel = SmtpChannel::new(settings()).unwrap();
        let message = channel
            .message("Camera Status Change Alert", "<p>gate: online</p>")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Camera Status Change Alert"));
        assert!(raw.lines().any(|l| l.starts_with("From: ") && l.contains("<cams@example.com>")));
        assert!(raw.contains("ops@example.com"));
        assert!(raw.contains("guard@example.com"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(raw.contains("<p>gate: online</p>"));
    }

    #[tokio::test]
    async fn rejects_bad_addresses() {
        let mut bad_sender = settings();
        bad_sender.sender = "not an address".to_string();
        assert!(matches!(
            SmtpChannel::new(bad_sender),
            Err(TransportError::InvalidDestination(_))
        ));

        let mut no_recipients = settings();
        no_recipients.recipients.clear();
        assert!(matches!(
            SmtpChannel::new(no_recipients),
            Err(TransportError::InvalidDestination(_))
        ));
    }

    #[tokio::test]
    async fn name_is_smtp() {
        assert_eq!(SmtpChannel::new(settings()).unwrap().name(), "smtp");
    }
}
