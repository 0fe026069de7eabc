//! Domain types for camera health.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classified health of one camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// No probe has completed yet.
    Unknown,
    /// Reachable and producing valid frames.
    Online,
    /// Unreachable, or connected without producing valid frames.
    Offline,
}

impl HealthState {
    /// Map a probe outcome onto a state.
    pub fn from_outcome(online: bool) -> Self {
        if online {
            HealthState::Online
        } else {
            HealthState::Offline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Unknown => "unknown",
            HealthState::Online => "online",
            HealthState::Offline => "offline",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of one camera changing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Process-wide sequence number, starting at 1.
    pub seq: u64,
    pub camera: String,
    pub previous: HealthState,
    pub current: HealthState,
    /// When the camera entered `previous`.
    pub previous_since: DateTime<Utc>,
    /// When the camera entered `current`.
    pub at: DateTime<Utc>,
}

/// One row of the status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraStatus {
    pub camera: String,
    pub state: HealthState,
    /// When the camera entered `state`.
    pub since: DateTime<Utc>,
}
