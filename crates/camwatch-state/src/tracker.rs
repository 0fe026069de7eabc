//! StatusTracker — edge-triggered health state per camera.
//!
//! All mutation goes through [`StatusTracker::record`], which holds the
//! write lock for the whole compare-update-append step. That keeps the
//! per-camera state, the history and the sequence counter consistent even
//! when probes for different cameras finish concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::types::{CameraStatus, HealthState, TransitionEvent};

/// Last known state of one camera.
#[derive(Debug, Clone, Copy)]
struct CameraSlot {
    state: HealthState,
    since: DateTime<Utc>,
}

#[derive(Debug)]
struct TrackerInner {
    /// camera name → slot.
    cameras: BTreeMap<String, CameraSlot>,
    /// Append-only, ordered by `seq`.
    history: Vec<TransitionEvent>,
    /// Sequence number for the next event.
    next_seq: u64,
    /// Creation time; the `since` of every `Unknown` slot.
    started_at: DateTime<Utc>,
}

/// Thread-safe tracker shared by the scheduler and the status surface.
#[derive(Debug, Clone)]
pub struct StatusTracker {
    inner: Arc<RwLock<TrackerInner>>,
}

impl StatusTracker {
    /// Create a tracker with every camera in `Unknown`.
    pub fn new<I, S>(cameras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let started_at = Utc::now();
        let cameras = cameras
            .into_iter()
            .map(|name| {
                (
                    name.into(),
                    CameraSlot {
                        state: HealthState::Unknown,
                        since: started_at,
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(RwLock::new(TrackerInner {
                cameras,
                history: Vec::new(),
                next_seq: 1,
                started_at,
            })),
        }
    }

    /// Record a probe outcome, stamped with the current time.
    ///
    /// Returns the transition if the camera's state changed.
    pub async fn record(&self, camera: &str, online: bool) -> Option<TransitionEvent> {
        self.record_at(camera, online, Utc::now()).await
    }

    /// Record a probe outcome observed at `at`.
    ///
    /// A camera the tracker was not created with is registered on the spot,
    /// starting from `Unknown`.
    pub async fn record_at(
        &self,
        camera: &str,
        online: bool,
        at: DateTime<Utc>,
    ) -> Option<TransitionEvent> {
        let current = HealthState::from_outcome(online);
        let mut inner = self.inner.write().await;
        let started_at = inner.started_at;

        let slot = inner
            .cameras
            .entry(camera.to_string())
            .or_insert(CameraSlot {
                state: HealthState::Unknown,
                since: started_at,
            });

        if slot.state == current {
            debug!(%camera, state = %current, "state unchanged");
            return None;
        }

        let previous = *slot;
        *slot = CameraSlot { state: current, since: at };

        let event = TransitionEvent {
            seq: inner.next_seq,
            camera: camera.to_string(),
            previous: previous.state,
            current,
            previous_since: previous.since,
            at,
        };
        inner.next_seq += 1;
        inner.history.push(event.clone());

        info!(
            %camera,
            seq = event.seq,
            from = %event.previous,
            to = %event.current,
            "camera state changed"
        );
        Some(event)
    }

    /// Current state of every known camera.
    pub async fn snapshot(&self) -> BTreeMap<String, HealthState> {
        let inner = self.inner.read().await;
        inner
            .cameras
            .iter()
            .map(|(name, slot)| (name.clone(), slot.state))
            .collect()
    }

    /// Current state of every known camera, with the time it was entered.
    pub async fn statuses(&self) -> Vec<CameraStatus> {
        let inner = self.inner.read().await;
        inner
            .cameras
            .iter()
            .map(|(name, slot)| CameraStatus {
                camera: name.clone(),
                state: slot.state,
                since: slot.since,
            })
            .collect()
    }

    /// Current state of one camera, `None` if it is not tracked.
    pub async fn state(&self, camera: &str) -> Option<HealthState> {
        let inner = self.inner.read().await;
        inner.cameras.get(camera).map(|slot| slot.state)
    }

    /// The full transition history, oldest first.
    pub async fn history(&self) -> Vec<TransitionEvent> {
        self.inner.read().await.history.clone()
    }

    /// History up to and including event `seq`.
    pub async fn history_through(&self, seq: u64) -> Vec<TransitionEvent> {
        let inner = self.inner.read().await;
        // `seq` is dense from 1, so it doubles as the prefix length.
        let end = (seq as usize).min(inner.history.len());
        inner.history[..end].to_vec()
    }

    /// Number of transitions recorded so far.
    pub async fn event_count(&self) -> usize {
        self.inner.read().await.history.len()
    }
}
