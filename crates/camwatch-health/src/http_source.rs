//! HTTP snapshot frame source.
//!
//! Most IP cameras expose a still-image URL next to their video stream
//! (`/snapshot.jpg`, `/cgi-bin/snapshot.cgi`, ...). Opening the source
//! establishes a keep-alive HTTP/1 connection; each read fetches one
//! snapshot and decodes it to RGB.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::Uri;
use http_body_util::{BodyExt, Empty, LengthLimitError, Limited};
use hyper::client::conn::http1::SendRequest;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{OpenError, ReadError};
use crate::frame::{Frame, FrameSource, FrameStream, PixelFormat};

/// Largest snapshot body accepted.
pub const MAX_SNAPSHOT_BYTES: usize = 16 * 1024 * 1024;

/// Opens `http://` snapshot endpoints.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    /// Bound on the TCP connect + handshake.
    connect_timeout: Duration,
}

impl Default for HttpSnapshotSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl HttpSnapshotSource {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

/// Split an endpoint into the URI, the `host:port` to dial and the request path.
fn parse_endpoint(endpoint: &str) -> Result<(Uri, String, String), OpenError> {
    let uri: Uri = endpoint.parse().map_err(|e: http::uri::InvalidUri| {
        OpenError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }
    })?;

    match uri.scheme_str() {
        Some("http") => {}
        _ => return Err(OpenError::UnsupportedScheme(endpoint.to_string())),
    }

    let host = uri.host().ok_or_else(|| OpenError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: "missing host".to_string(),
    })?;
    let address = format!("{host}:{}", uri.port_u16().unwrap_or(80));
    let path = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    Ok((uri, address, path))
}

#[async_trait]
impl FrameSource for HttpSnapshotSource {
    async fn open(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, OpenError> {
        let (uri, address, path) = parse_endpoint(endpoint)?;
        let connect_err = |reason: String| OpenError::Connect {
            endpoint: endpoint.to_string(),
            reason,
        };

        let connect = async {
            let stream = tokio::net::TcpStream::connect(&address)
                .await
                .map_err(|e| connect_err(e.to_string()))?;
            let io = hyper_util::rt::TokioIo::new(stream);
            hyper::client::conn::http1::handshake::<_, Empty<Bytes>>(io)
                .await
                .map_err(|e| connect_err(e.to_string()))
        };

        let (sender, conn) = tokio::time::timeout(self.connect_timeout, connect)
            .await
            .map_err(|_| connect_err(format!("timed out after {:?}", self.connect_timeout)))??;

        // Drive the connection in the background until the stream closes.
        let conn = tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "snapshot connection ended");
            }
        });

        let host = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .unwrap_or_else(|| address.clone());

        debug!(%endpoint, "snapshot source opened");
        Ok(Box::new(HttpSnapshotStream {
            sender: Some(sender),
            conn,
            host,
            path,
        }))
    }
}

struct HttpSnapshotStream {
    sender: Option<SendRequest<Empty<Bytes>>>,
    conn: JoinHandle<()>,
    host: String,
    path: String,
}

impl HttpSnapshotStream {
    async fn fetch(&mut self) -> Result<Bytes, ReadError> {
        let sender = self.sender.as_mut().ok_or(ReadError::Closed)?;
        sender
            .ready()
            .await
            .map_err(|e| ReadError::Request(e.to_string()))?;

        let req = http::Request::builder()
            .method("GET")
            .uri(self.path.as_str())
            .header("host", self.host.as_str())
            .header("user-agent", "camwatch/0.1")
            .body(Empty::<Bytes>::new())
            .map_err(|e| ReadError::Request(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| ReadError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ReadError::Status(resp.status().as_u16()));
        }

        let body = Limited::new(resp.into_body(), MAX_SNAPSHOT_BYTES)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    ReadError::TooLarge(MAX_SNAPSHOT_BYTES)
                } else {
                    ReadError::Request(e.to_string())
                }
            })?;
        Ok(body.to_bytes())
    }
}

#[async_trait]
impl FrameStream for HttpSnapshotStream {
    async fn read(&mut self) -> Result<Frame, ReadError> {
        let body = self.fetch().await?;

        // Decoding is CPU-bound; keep it off the reactor.
        tokio::task::spawn_blocking(move || decode_snapshot(&body))
            .await
            .map_err(|e| ReadError::Decode(e.to_string()))?
    }

    async fn close(&mut self) {
        self.sender = None;
        self.conn.abort();
    }
}

/// Decode a JPEG/PNG snapshot into an RGB frame.
pub fn decode_snapshot(body: &[u8]) -> Result<Frame, ReadError> {
    let image = image::load_from_memory(body).map_err(|e| ReadError::Decode(e.to_string()))?;
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::new(width, height, PixelFormat::Rgb8, rgb.into_raw()))
}
