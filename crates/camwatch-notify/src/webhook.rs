//! Webhook notification channel.
//!
//! POSTs `{"subject": .., "html": ..}` as JSON to a plain-HTTP endpoint
//! (chat bridges, mail relays, incident tools) over a fresh HTTP/1
//! connection per alert.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::Uri;
use http_body_util::Full;
use tracing::debug;

use crate::channel::NotificationChannel;
use crate::error::TransportError;

/// Sends alerts to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    uri: Uri,
    /// `host:port` to dial.
    address: String,
    timeout: Duration,
}

impl WebhookChannel {
    /// Create a channel for `url`. Only `http://` URLs are accepted.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let uri: Uri = url
            .parse()
            .map_err(|e| TransportError::InvalidDestination(format!("{url}: {e}")))?;

        if uri.scheme_str() != Some("http") {
            return Err(TransportError::InvalidDestination(format!(
                "{url}: only http:// webhooks are supported"
            )));
        }
        let host = uri
            .host()
            .ok_or_else(|| TransportError::InvalidDestination(format!("{url}: missing host")))?;
        let address = format!("{host}:{}", uri.port_u16().unwrap_or(80));

        Ok(Self {
            uri,
            address,
            timeout,
        })
    }

    async fn post(&self, body: String) -> Result<(), TransportError> {
        let stream = tokio::net::TcpStream::connect(&self.address)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let authority = self
            .uri
            .authority()
            .map(|a| a.as_str())
            .unwrap_or(self.address.as_str());

        let path = self
            .uri
            .path_and_query()
            .map(|p| p.as_str())
            .unwrap_or("/");

        let req = http::Request::builder()
            .method("POST")
            .uri(path)
            .header("host", authority)
            .header("content-type", "application/json")
            .header("user-agent", "camwatch/0.1")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            debug!(status = %resp.status(), uri = %self.uri, "webhook non-2xx");
            Err(TransportError::Rejected(resp.status().as_u16()))
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, subject: &str, html_body: &str) -> Result<(), TransportError> {
        let body = serde_json::json!({
            "subject": subject,
            "html": html_body,
        })
        .to_string();

        tokio::time::timeout(self.timeout, self.post(body))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
    }
}
