//! camwatch-core — configuration shared by every camwatch crate.
//!
//! Parses `camwatch.toml` into a [`MonitorConfig`] and resolves the
//! human-readable duration strings (`"5s"`, `"500ms"`, `"1m"`) into the
//! typed [`ProbeSettings`] consumed by the probe and scheduler.

pub mod config;
pub mod duration;
pub mod error;

pub use config::{
    CameraConfig, HttpConfig, MonitorConfig, NotifyConfig, NotifyKind, ProbeConfig,
    ProbeSettings, SmtpConfig, ValidatorConfig,
};
pub use duration::parse_duration;
pub use error::{ConfigError, ConfigResult};
