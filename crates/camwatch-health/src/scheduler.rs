//! Scheduler — the periodic check cycle.
//!
//! A cycle has two phases. The probe phase runs one task per camera and
//! only produces outcomes; it may be abandoned on shutdown. The commit
//! phase records outcomes in configured camera order and dispatches an
//! alert for each transition; it always runs to completion once started.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use camwatch_core::CameraConfig;
use camwatch_notify::AlertDispatcher;
use camwatch_state::StatusTracker;

use crate::probe::CameraProbe;

/// Drives probes, state tracking and alerting for a fixed camera set.
pub struct Scheduler {
    cameras: Arc<[CameraConfig]>,
    probe: Arc<CameraProbe>,
    tracker: StatusTracker,
    dispatcher: AlertDispatcher,
    /// Held for the duration of a cycle so cycles never overlap.
    cycle: Arc<Mutex<()>>,
}

impl Scheduler {
    pub fn new(
        cameras: Vec<CameraConfig>,
        probe: CameraProbe,
        tracker: StatusTracker,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            cameras: cameras.into(),
            probe: Arc::new(probe),
            tracker,
            dispatcher,
            cycle: Arc::new(Mutex::new(())),
        }
    }

    pub fn cameras(&self) -> &[CameraConfig] {
        &self.cameras
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    /// Run one full cycle and return each camera's outcome (`true` = online).
    ///
    /// Dropping the returned future during the probe phase abandons the
    /// cycle. Once probing is done the commit runs on its own task and
    /// finishes even if the caller goes away.
    pub async fn run_once(&self) -> BTreeMap<String, bool> {
        let cycle = Arc::clone(&self.cycle).lock_owned().await;
        let outcomes = self.probe_all().await;
        self.commit(cycle, outcomes).await
    }

    /// Run cycles every `interval` until `shutdown` flips.
    ///
    /// A shutdown while waiting for a running cycle, or during the probe
    /// phase, abandons the cycle before any state is recorded. The commit
    /// phase is never interrupted.
    pub async fn run_forever(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(
            cameras = self.cameras.len(),
            interval_secs = interval.as_secs(),
            "camera scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let cycle = tokio::select! {
                cycle = Arc::clone(&self.cycle).lock_owned() => cycle,
                _ = shutdown.changed() => {
                    info!("shutdown while waiting for running cycle");
                    break;
                }
            };
            let outcomes = tokio::select! {
                outcomes = self.probe_all() => outcomes,
                _ = shutdown.changed() => {
                    info!("shutdown during probe phase, cycle abandoned");
                    break;
                }
            };
            self.commit(cycle, outcomes).await;

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("camera scheduler stopped");
    }

    /// Probe every camera concurrently.
    ///
    /// Returns outcomes indexed like `self.cameras`; `None` for a probe task
    /// that died. Dropping the future aborts all outstanding probes.
    async fn probe_all(&self) -> Vec<Option<bool>> {
        let mut tasks = JoinSet::new();
        for (index, camera) in self.cameras.iter().enumerate() {
            let probe = Arc::clone(&self.probe);
            let camera = camera.clone();
            tasks.spawn(async move { (index, probe.probe(&camera).await) });
        }

        let mut outcomes = vec![None; self.cameras.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, online)) => outcomes[index] = Some(online),
                Err(e) => error!(error = %e, "probe task failed"),
            }
        }
        outcomes
    }

    /// Hand the outcomes to a commit task and wait for it.
    ///
    /// The task owns the cycle guard, so no other cycle starts until every
    /// outcome is recorded and every alert has been attempted.
    async fn commit(
        &self,
        cycle: OwnedMutexGuard<()>,
        outcomes: Vec<Option<bool>>,
    ) -> BTreeMap<String, bool> {
        let cameras = Arc::clone(&self.cameras);
        let tracker = self.tracker.clone();
        let dispatcher = self.dispatcher.clone();

        let task = tokio::spawn(async move {
            let results = commit_outcomes(&cameras, &tracker, &dispatcher, &outcomes).await;
            drop(cycle);
            results
        });

        match task.await {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, "commit task failed");
                BTreeMap::new()
            }
        }
    }
}

/// Record outcomes in camera order and alert on every transition.
async fn commit_outcomes(
    cameras: &[CameraConfig],
    tracker: &StatusTracker,
    dispatcher: &AlertDispatcher,
    outcomes: &[Option<bool>],
) -> BTreeMap<String, bool> {
    let mut results = BTreeMap::new();

    for (camera, outcome) in cameras.iter().zip(outcomes) {
        let Some(online) = *outcome else {
            continue;
        };
        results.insert(camera.name.clone(), online);

        let Some(event) = tracker.record(&camera.name, online).await else {
            continue;
        };

        let history = tracker.history_through(event.seq).await;
        if let Err(e) = dispatcher.dispatch(&event, &history).await {
            // State is already committed; the alert is simply lost.
            debug!(seq = event.seq, error = %e, "alert dropped");
        }
    }

    let online = results.values().filter(|v| **v).count();
    info!(online, offline = results.len() - online, "check cycle complete");
    results
}
