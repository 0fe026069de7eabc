//! AlertDispatcher — renders a transition and hands it to a channel.

use std::sync::Arc;

use tracing::{debug, error};

use camwatch_state::TransitionEvent;

use crate::channel::NotificationChannel;
use crate::error::NotifyError;
use crate::render::render_alert;

/// Sends one alert per state transition.
#[derive(Clone)]
pub struct AlertDispatcher {
    channel: Arc<dyn NotificationChannel>,
    subject: String,
}

impl AlertDispatcher {
    pub fn new(channel: Arc<dyn NotificationChannel>, subject: impl Into<String>) -> Self {
        Self {
            channel,
            subject: subject.into(),
        }
    }

    /// Name of the underlying channel.
    pub fn channel_name(&self) -> &'static str {
        self.channel.name()
    }

    /// Render `event` with `history` (which should end at `event`) and send it.
    ///
    /// Failures are logged here and returned; callers decide whether to
    /// care. Tracker state is never touched.
    pub async fn dispatch(
        &self,
        event: &TransitionEvent,
        history: &[TransitionEvent],
    ) -> Result<(), NotifyError> {
        let payload = render_alert(&self.subject, event, history);

        match self.channel.send(&payload.subject, &payload.html).await {
            Ok(()) => {
                debug!(
                    seq = event.seq,
                    camera = %event.camera,
                    channel = self.channel.name(),
                    rows = history.len(),
                    "alert sent"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    seq = event.seq,
                    camera = %event.camera,
                    channel = self.channel.name(),
                    error = %e,
                    "alert delivery failed"
                );
                Err(NotifyError::Transport {
                    seq: event.seq,
                    channel: self.channel.name(),
                    source: e,
                })
            }
        }
    }
}
