//! Wires a [`MonitorConfig`] into a running scheduler.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use camwatch_core::{MonitorConfig, NotifyKind};
use camwatch_health::{
    CameraProbe, FrameValidator, HttpSnapshotSource, RtspSource, Scheduler, SchemeSource,
};
use camwatch_notify::{
    AlertDispatcher, LogChannel, NotificationChannel, SmtpChannel, SmtpSettings, WebhookChannel,
};
use camwatch_state::StatusTracker;

/// Build the notification channel selected by `[notify]`.
pub fn build_channel(config: &MonitorConfig) -> anyhow::Result<Arc<dyn NotificationChannel>> {
    match config.notify.kind {
        NotifyKind::Log => Ok(Arc::new(LogChannel)),
        NotifyKind::Webhook => {
            let url = config
                .notify
                .webhook_url
                .as_deref()
                .context("notify.webhook_url is required for the webhook channel")?;
            let channel = WebhookChannel::new(url, config.webhook_timeout()?)
                .with_context(|| format!("invalid webhook url {url}"))?;
            Ok(Arc::new(channel))
        }
        NotifyKind::Smtp => {
            let smtp = &config.notify.smtp;
            let channel = SmtpChannel::new(SmtpSettings {
                server: smtp.server.clone(),
                port: smtp.port,
                login: smtp.login().to_string(),
                password: smtp.password.clone(),
                sender: smtp.sender.clone(),
                recipients: smtp.recipients.clone(),
                timeout: config.smtp_timeout()?,
            })
            .with_context(|| format!("invalid smtp settings for {}", smtp.server))?;
            Ok(Arc::new(channel))
        }
    }
}

/// Build the scheduler and every component underneath it.
///
/// `interval` is the effective check interval, used only to warn when a
/// single probe can outlast it.
pub fn build_scheduler(config: &MonitorConfig, interval: Duration) -> anyhow::Result<Arc<Scheduler>> {
    let settings = config.probe_settings()?;

    let latency = settings.worst_case_latency();
    if latency >= interval {
        warn!(
            worst_case_secs = latency.as_secs(),
            interval_secs = interval.as_secs(),
            "a failing camera can take longer than the check interval; cycles will run back to back"
        );
    }

    let source = Arc::new(SchemeSource::new(
        Arc::new(HttpSnapshotSource::new(settings.open_timeout)),
        Arc::new(RtspSource::new(config.probe.ffmpeg.clone())),
    ));
    let probe = CameraProbe::new(
        source,
        FrameValidator::new(config.validator.variance_threshold),
        settings,
    );
    let tracker = StatusTracker::new(config.cameras.iter().map(|c| c.name.clone()));
    let channel = build_channel(config)?;
    let dispatcher = AlertDispatcher::new(channel, config.notify.subject.clone());

    info!(
        cameras = config.cameras.len(),
        channel = dispatcher.channel_name(),
        retries = settings.retries,
        "monitor assembled"
    );

    Ok(Arc::new(Scheduler::new(
        config.cameras.clone(),
        probe,
        tracker,
        dispatcher,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camwatch_core::CameraConfig;
    use camwatch_state::HealthState;

    fn config() -> MonitorConfig {
        let mut config = MonitorConfig::scaffold();
        config.cameras.push(CameraConfig::new("yard", "http://192.168.1.11/snap.jpg"));
        config
    }

    #[test]
    fn log_channel_by_default() {
        let channel = build_channel(&config()).unwrap();
        assert_eq!(channel.name(), "log");
    }

    #[test]
    fn webhook_channel_when_configured() {
        let mut config = config();
        config.notify.kind = NotifyKind::Webhook;
        config.notify.webhook_url = Some("http://127.0.0.1:9000/hook".to_string());
        let channel = build_channel(&config).unwrap();
        assert_eq!(channel.name(), "webhook");
    }

    #[test]
    fn webhook_channel_rejects_https() {
        let mut config = config();
        config.notify.kind = NotifyKind::Webhook;
        config.notify.webhook_url = Some("https://hooks.example.com/x".to_string());
        assert!(build_channel(&config).is_err());
    }

    #[tokio::test]
    async fn smtp_channel_when_configured() {
        let mut config = config();
        config.notify.kind = NotifyKind::Smtp;
        config.notify.smtp.server = "smtp.example.com".to_string();
        config.notify.smtp.sender = "cams@example.com".to_string();
        config.notify.smtp.recipients = vec!["ops@example.com".to_string()];
        config.validate().unwrap();

        let channel = build_channel(&config).unwrap();
        assert_eq!(channel.name(), "smtp");
    }

    #[tokio::test]
    async fn rtsp_cameras_are_accepted() {
        let mut config = config();
        config
            .cameras
            .push(CameraConfig::new("gate", "rtsp://192.168.1.115/camera1"));
        let scheduler = build_scheduler(&config, Duration::from_secs(60)).unwrap();
        assert_eq!(scheduler.cameras().len(), 3);
    }

    #[tokio::test]
    async fn scheduler_starts_with_every_camera_unknown() {
        let scheduler = build_scheduler(&config(), Duration::from_secs(60)).unwrap();
        assert_eq!(scheduler.cameras().len(), 2);

        let snapshot = scheduler.tracker().snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.values().all(|s| *s == HealthState::Unknown));
    }
}
