//! Camera probe — the bounded retry/timeout protocol for one camera.
//!
//! Two levels: the attempt loop (open, read window, close) and the read
//! loop inside one window. The first valid frame short-circuits both.

use std::sync::Arc;

use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use camwatch_core::{CameraConfig, ProbeSettings};

use crate::frame::{FrameSource, FrameStream};
use crate::validator::FrameValidator;

/// Result of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    /// A valid frame arrived within the read window.
    Live,
    /// The source opened, but no valid frame arrived in time.
    NoValidFrame,
    /// The source could not be opened (error or timeout).
    OpenFailed,
}

/// Probes cameras through a [`FrameSource`].
#[derive(Clone)]
pub struct CameraProbe {
    source: Arc<dyn FrameSource>,
    validator: FrameValidator,
    settings: ProbeSettings,
}

impl CameraProbe {
    pub fn new(
        source: Arc<dyn FrameSource>,
        validator: FrameValidator,
        settings: ProbeSettings,
    ) -> Self {
        Self {
            source,
            validator,
            settings,
        }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Whether `camera` is producing valid video. `true` means online.
    pub async fn probe(&self, camera: &CameraConfig) -> bool {
        let retries = self.settings.retries;

        for attempt in 1..=retries {
            debug!(camera = %camera.name, attempt, retries, "probe attempt");

            match self.attempt(camera).await {
                AttemptResult::Live => {
                    debug!(camera = %camera.name, attempt, "valid frame received");
                    return true;
                }
                AttemptResult::NoValidFrame => {
                    warn!(camera = %camera.name, attempt, retries, "no valid frame");
                }
                AttemptResult::OpenFailed => {
                    warn!(camera = %camera.name, attempt, retries, "could not open stream");
                    if attempt < retries {
                        sleep(self.settings.open_backoff).await;
                    }
                }
            }
        }

        false
    }

    /// Run one attempt: open, read for one window, close.
    pub async fn attempt(&self, camera: &CameraConfig) -> AttemptResult {
        let opened = timeout(self.settings.open_timeout, self.source.open(&camera.endpoint)).await;
        let mut stream = match opened {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                debug!(camera = %camera.name, error = %e, "open failed");
                return AttemptResult::OpenFailed;
            }
            Err(_) => {
                debug!(camera = %camera.name, timeout = ?self.settings.open_timeout, "open timed out");
                return AttemptResult::OpenFailed;
            }
        };

        let result = self.read_window(camera, stream.as_mut()).await;
        stream.close().await;
        result
    }

    /// Read until a valid frame arrives or the window closes.
    async fn read_window(&self, camera: &CameraConfig, stream: &mut dyn FrameStream) -> AttemptResult {
        let window = self.settings.read_window;
        let started = Instant::now();

        while let Some(remaining) = window.checked_sub(started.elapsed()).filter(|r| !r.is_zero()) {
            match timeout(remaining, stream.read()).await {
                Ok(Ok(frame)) => {
                    if self.validator.validate(Some(&frame)) {
                        return AttemptResult::Live;
                    }
                    debug!(
                        camera = %camera.name,
                        width = frame.width,
                        height = frame.height,
                        "frame rejected"
                    );
                }
                Ok(Err(e)) => {
                    debug!(camera = %camera.name, error = %e, "read failed");
                }
                Err(_) => {
                    // The read consumed the rest of the window.
                    debug!(camera = %camera.name, "read timed out");
                    break;
                }
            }
            sleep(self.settings.poll_interval).await;
        }

        AttemptResult::NoValidFrame
    }
}
