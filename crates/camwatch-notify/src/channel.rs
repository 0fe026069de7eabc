//! Notification channel capability.

use async_trait::async_trait;
use tracing::info;

use crate::error::TransportError;

/// Delivers a rendered alert somewhere a human will see it.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short name for logs (e.g. "webhook").
    fn name(&self) -> &'static str;

    /// Send one alert.
    async fn send(&self, subject: &str, html_body: &str) -> Result<(), TransportError>;
}

/// Writes alerts to the log instead of sending them anywhere.
#[derive(Debug, Default, Clone)]
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, subject: &str, html_body: &str) -> Result<(), TransportError> {
        info!(%subject, bytes = html_body.len(), body = %html_body, "alert");
        Ok(())
    }
}
