//! End-to-end check cycles against a switchable fake camera.
//!
//! Covers first contact, outage and recovery, repeated failures, and a
//! broken notification channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use camwatch_core::{CameraConfig, ProbeSettings};
use camwatch_health::{
    CameraProbe, Frame, FrameSource, FrameStream, FrameValidator, OpenError, PixelFormat,
    ReadError, Scheduler,
};
use camwatch_notify::{AlertDispatcher, NotificationChannel, TransportError};
use camwatch_state::{HealthState, StatusTracker};

/// Cameras that are either fully up or refuse connections.
#[derive(Default)]
struct SwitchableCameras {
    up: Mutex<HashMap<String, bool>>,
    opens: AtomicUsize,
}

impl SwitchableCameras {
    fn set(&self, endpoint: &str, up: bool) {
        self.up.lock().unwrap().insert(endpoint.to_string(), up);
    }
}

#[async_trait]
impl FrameSource for SwitchableCameras {
    async fn open(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, OpenError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let up = self.up.lock().unwrap().get(endpoint).copied().unwrap_or(false);
        if up {
            Ok(Box::new(LiveStream))
        } else {
            Err(OpenError::Connect {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }
}

struct LiveStream;

#[async_trait]
impl FrameStream for LiveStream {
    async fn read(&mut self) -> Result<Frame, ReadError> {
        let data: Vec<u8> = (0..64u32).map(|i| (i * 4) as u8).collect();
        Ok(Frame::new(8, 8, PixelFormat::Gray8, Bytes::from(data)))
    }
}

#[derive(Default)]
struct Mailbox {
    sent: Mutex<Vec<String>>,
    broken: AtomicBool,
}

#[async_trait]
impl NotificationChannel for Mailbox {
    fn name(&self) -> &'static str {
        "mailbox"
    }

    async fn send(&self, _subject: &str, html_body: &str) -> Result<(), TransportError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(TransportError::Connect("smtp relay down".to_string()));
        }
        self.sent.lock().unwrap().push(html_body.to_string());
        Ok(())
    }
}

const GATE: &str = "http://gate.cam/snap.jpg";

struct Harness {
    cameras: Arc<SwitchableCameras>,
    mailbox: Arc<Mailbox>,
    scheduler: Scheduler,
}

fn harness() -> Harness {
    let cameras = Arc::new(SwitchableCameras::default());
    let mailbox = Arc::new(Mailbox::default());
    let config = vec![CameraConfig::new("gate", GATE)];
    let tracker = StatusTracker::new(config.iter().map(|c| c.name.clone()));
    let probe = CameraProbe::new(
        cameras.clone(),
        FrameValidator::default(),
        ProbeSettings::default(),
    );
    let dispatcher = AlertDispatcher::new(mailbox.clone(), "Camera Status Change Alert");
    Harness {
        cameras,
        mailbox,
        scheduler: Scheduler::new(config, probe, tracker, dispatcher),
    }
}

impl Harness {
    fn sent(&self) -> Vec<String> {
        self.mailbox.sent.lock().unwrap().clone()
    }
}

#[tokio::test(start_paused = true)]
async fn first_contact_online() {
    let h = harness();
    h.cameras.set(GATE, true);

    let results = h.scheduler.run_once().await;
    assert_eq!(results.get("gate"), Some(&true));

    let history = h.scheduler.tracker().history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].seq, 1);
    assert_eq!(history[0].previous, HealthState::Unknown);
    assert_eq!(history[0].current, HealthState::Online);

    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("<td>gate</td>"));
}

#[tokio::test(start_paused = true)]
async fn outage_then_recovery() {
    let h = harness();
    h.cameras.set(GATE, true);
    h.scheduler.run_once().await;

    h.cameras.set(GATE, false);
    let opens_before = h.cameras.opens.load(Ordering::SeqCst);
    let results = h.scheduler.run_once().await;
    assert_eq!(results.get("gate"), Some(&false));
    // All three retries were spent before giving up.
    assert_eq!(h.cameras.opens.load(Ordering::SeqCst) - opens_before, 3);

    h.cameras.set(GATE, true);
    h.scheduler.run_once().await;

    let history = h.scheduler.tracker().history().await;
    let edges: Vec<_> = history.iter().map(|e| (e.seq, e.previous, e.current)).collect();
    assert_eq!(
        edges,
        vec![
            (1, HealthState::Unknown, HealthState::Online),
            (2, HealthState::Online, HealthState::Offline),
            (3, HealthState::Offline, HealthState::Online),
        ]
    );

    // Every alert restates the history so far.
    let sent = h.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2].matches("<td>gate</td>").count(), 3);
    assert_eq!(sent[1].matches("<td>gate</td>").count(), 2);
}

#[tokio::test(start_paused = true)]
async fn repeated_failure_is_silent() {
    let h = harness();
    h.cameras.set(GATE, false);
    h.scheduler.run_once().await;
    assert_eq!(h.sent().len(), 1);

    h.scheduler.run_once().await;
    h.scheduler.run_once().await;

    assert_eq!(h.sent().len(), 1);
    assert_eq!(h.scheduler.tracker().event_count().await, 1);
    assert_eq!(
        h.scheduler.tracker().state("gate").await,
        Some(HealthState::Offline)
    );
}

#[tokio::test(start_paused = true)]
async fn broken_channel_does_not_affect_state() {
    let h = harness();
    h.mailbox.broken.store(true, Ordering::SeqCst);
    h.cameras.set(GATE, true);

    let results = h.scheduler.run_once().await;
    assert_eq!(results.get("gate"), Some(&true));
    assert_eq!(
        h.scheduler.tracker().state("gate").await,
        Some(HealthState::Online)
    );
    assert_eq!(h.scheduler.tracker().event_count().await, 1);

    // The lost alert is not retried; the next transition still alerts.
    h.mailbox.broken.store(false, Ordering::SeqCst);
    h.cameras.set(GATE, false);
    h.scheduler.run_once().await;

    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("online &rarr; offline"));
}
