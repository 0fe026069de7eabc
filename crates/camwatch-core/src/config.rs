//! camwatch.toml configuration parser.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Pause between check cycles (e.g., "60s").
    #[serde(default = "default_check_interval")]
    pub check_interval: String,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
}

/// A monitored video source. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Display label, unique across the config.
    pub name: String,
    /// Stream or snapshot URI.
    pub endpoint: String,
}

impl CameraConfig {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Raw retry/timeout policy as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub retries: u32,
    pub read_window: String,
    pub poll_interval: String,
    pub open_backoff: String,
    pub open_timeout: String,
    /// ffmpeg binary used to pull frames from `rtsp://` endpoints.
    pub ffmpeg: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            read_window: "5s".to_string(),
            poll_interval: "1s".to_string(),
            open_backoff: "2s".to_string(),
            open_timeout: "5s".to_string(),
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

impl ProbeConfig {
    /// Resolve duration strings into a typed [`ProbeSettings`].
    pub fn settings(&self) -> ConfigResult<ProbeSettings> {
        if self.retries == 0 {
            return Err(ConfigError::Invalid {
                field: "probe.retries",
                reason: "must be at least 1".to_string(),
            });
        }
        let read_window = duration_field("probe.read_window", &self.read_window)?;
        if read_window.is_zero() {
            return Err(ConfigError::Invalid {
                field: "probe.read_window",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(ProbeSettings {
            retries: self.retries,
            read_window,
            poll_interval: duration_field("probe.poll_interval", &self.poll_interval)?,
            open_backoff: duration_field("probe.open_backoff", &self.open_backoff)?,
            open_timeout: duration_field("probe.open_timeout", &self.open_timeout)?,
        })
    }
}

/// Retry/timeout policy for probing a single camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Attempts before a camera is declared offline.
    pub retries: u32,
    /// How long one attempt keeps reading frames.
    pub read_window: Duration,
    /// Pause between reads inside one attempt.
    pub poll_interval: Duration,
    /// Pause after a source fails to open.
    pub open_backoff: Duration,
    /// Upper bound on a single open call.
    pub open_timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            retries: 3,
            read_window: Duration::from_secs(5),
            poll_interval: Duration::from_secs(1),
            open_backoff: Duration::from_secs(2),
            open_timeout: Duration::from_secs(5),
        }
    }
}

impl ProbeSettings {
    /// Longest a probe of one camera can take before returning `false`.
    ///
    /// Each attempt either times out opening and backs off, or opens and
    /// reads for at most one window (plus one trailing poll sleep).
    /// Saturates at `Duration::MAX`.
    pub fn worst_case_latency(&self) -> Duration {
        let open_failure = self.open_timeout.saturating_add(self.open_backoff);
        let read_failure = self
            .open_timeout
            .saturating_add(self.read_window)
            .saturating_add(self.poll_interval);
        open_failure.max(read_failure).saturating_mul(self.retries)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Minimum luma variance for a frame to count as live video.
    pub variance_threshold: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            variance_threshold: 10.0,
        }
    }
}

/// Which notification channel alerts go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotifyKind {
    #[default]
    Log,
    Webhook,
    Smtp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub kind: NotifyKind,
    pub subject: String,
    pub webhook_url: Option<String>,
    pub webhook_timeout: String,
    pub smtp: SmtpConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            kind: NotifyKind::Log,
            subject: "Camera Status Change Alert".to_string(),
            webhook_url: None,
            webhook_timeout: "10s".to_string(),
            smtp: SmtpConfig::default(),
        }
    }
}

/// Mail relay settings for `kind = "smtp"`. Connections use STARTTLS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    /// Login name; the sender address when unset.
    pub username: Option<String>,
    pub password: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub timeout: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: 587,
            username: None,
            password: String::new(),
            sender: String::new(),
            recipients: Vec::new(),
            timeout: "30s".to_string(),
        }
    }
}

impl SmtpConfig {
    pub fn login(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.sender)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "notify.smtp.server",
                reason: "required when notify.kind = \"smtp\"".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                field: "notify.smtp.port",
                reason: "must be non-zero".to_string(),
            });
        }
        if !looks_like_address(&self.sender) {
            return Err(ConfigError::Invalid {
                field: "notify.smtp.sender",
                reason: format!("{:?} is not an email address", self.sender),
            });
        }
        if self.recipients.is_empty() {
            return Err(ConfigError::Invalid {
                field: "notify.smtp.recipients",
                reason: "at least one recipient is required".to_string(),
            });
        }
        if let Some(bad) = self.recipients.iter().find(|r| !looks_like_address(r)) {
            return Err(ConfigError::Invalid {
                field: "notify.smtp.recipients",
                reason: format!("{bad:?} is not an email address"),
            });
        }
        duration_field("notify.smtp.timeout", &self.timeout)?;
        Ok(())
    }
}

/// `local@domain` with both halves present. Full parsing happens when the
/// channel is built.
fn looks_like_address(s: &str) -> bool {
    matches!(s.trim().split_once('@'), Some((local, domain)) if !local.is_empty() && !domain.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub listen: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: "127.0.0.1:8080".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: MonitorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check everything that can be checked without touching the network.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cameras.is_empty() {
            return Err(ConfigError::NoCameras);
        }

        let mut seen = HashSet::new();
        for (i, camera) in self.cameras.iter().enumerate() {
            if camera.name.trim().is_empty() {
                return Err(ConfigError::EmptyCameraName(i));
            }
            if !seen.insert(camera.name.as_str()) {
                return Err(ConfigError::DuplicateCamera(camera.name.clone()));
            }
        }

        let threshold = self.validator.variance_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "validator.variance_threshold",
                reason: format!("{threshold} is not a non-negative number"),
            });
        }

        if self.notify.kind == NotifyKind::Webhook && self.notify.webhook_url.is_none() {
            return Err(ConfigError::Invalid {
                field: "notify.webhook_url",
                reason: "required when notify.kind = \"webhook\"".to_string(),
            });
        }
        self.webhook_timeout()?;
        if self.notify.kind == NotifyKind::Smtp {
            self.notify.smtp.validate()?;
        }
        self.check_interval()?;
        self.probe.settings()?;
        Ok(())
    }

    pub fn check_interval(&self) -> ConfigResult<Duration> {
        duration_field("check_interval", &self.check_interval)
    }

    pub fn probe_settings(&self) -> ConfigResult<ProbeSettings> {
        self.probe.settings()
    }

    pub fn webhook_timeout(&self) -> ConfigResult<Duration> {
        duration_field("notify.webhook_timeout", &self.notify.webhook_timeout)
    }

    pub fn smtp_timeout(&self) -> ConfigResult<Duration> {
        duration_field("notify.smtp.timeout", &self.notify.smtp.timeout)
    }

    /// Scaffold a starter camwatch.toml with one placeholder camera.
    pub fn scaffold() -> Self {
        MonitorConfig {
            check_interval: default_check_interval(),
            probe: ProbeConfig::default(),
            validator: ValidatorConfig::default(),
            notify: NotifyConfig::default(),
            http: HttpConfig::default(),
            cameras: vec![CameraConfig::new(
                "front-door",
                "http://192.168.1.10/snapshot.jpg",
            )],
        }
    }
}

fn default_check_interval() -> String {
    "60s".to_string()
}

fn duration_field(field: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_duration(value).ok_or_else(|| ConfigError::Duration {
        field,
        value: value.to_string(),
    })
}
