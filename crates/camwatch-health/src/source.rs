//! Endpoint scheme routing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::OpenError;
use crate::frame::{FrameSource, FrameStream};

/// Sends each endpoint to the source that understands its scheme.
///
/// `http://` goes to the snapshot source, `rtsp://` and `rtsps://` to the
/// stream source. Anything else fails to open.
#[derive(Clone)]
pub struct SchemeSource {
    http: Arc<dyn FrameSource>,
    rtsp: Arc<dyn FrameSource>,
}

impl SchemeSource {
    pub fn new(http: Arc<dyn FrameSource>, rtsp: Arc<dyn FrameSource>) -> Self {
        Self { http, rtsp }
    }
}

#[async_trait]
impl FrameSource for SchemeSource {
    async fn open(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, OpenError> {
        let scheme = endpoint
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase());

        match scheme.as_deref() {
            Some("http") => self.http.open(endpoint).await,
            Some("rtsp" | "rtsps") => self.rtsp.open(endpoint).await,
            _ => Err(OpenError::UnsupportedScheme(endpoint.to_string())),
        }
    }
}
