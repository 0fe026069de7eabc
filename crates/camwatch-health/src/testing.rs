//! Scripted frame sources for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{OpenError, ReadError};
use crate::frame::{Frame, FrameSource, FrameStream, PixelFormat};

/// What one read returns.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Valid,
    Invalid,
    Error,
    Hang,
}

/// What one open call does.
#[derive(Debug, Clone)]
pub enum Attempt {
    OpenFail,
    OpenHang,
    /// Reads follow the steps, then keep returning invalid frames.
    Stream(Vec<Step>),
}

/// Checkerboard, variance well above the default threshold.
pub fn valid_frame() -> Frame {
    let data: Vec<u8> = (0..16).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
    Frame::new(4, 4, PixelFormat::Gray8, data)
}

/// Solid grey, zero variance.
pub fn invalid_frame() -> Frame {
    Frame::new(4, 4, PixelFormat::Gray8, vec![128u8; 16])
}

pub fn online() -> Vec<Attempt> {
    vec![Attempt::Stream(vec![Step::Valid])]
}

pub fn offline(retries: u32) -> Vec<Attempt> {
    vec![Attempt::OpenFail; retries as usize]
}

#[derive(Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub reads: AtomicUsize,
    pub closes: AtomicUsize,
}

/// Frame source following a per-endpoint script. An endpoint with no
/// script left fails to open.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Attempt>>>,
    pub counters: Arc<Counters>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append attempts to `endpoint`'s script.
    pub fn push(&self, endpoint: &str, attempts: Vec<Attempt>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .extend(attempts);
    }

    pub fn opens(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn open(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, OpenError> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Attempt::OpenFail);

        match next {
            Attempt::OpenFail => Err(OpenError::Connect {
                endpoint: endpoint.to_string(),
                reason: "scripted failure".to_string(),
            }),
            Attempt::OpenHang => std::future::pending().await,
            Attempt::Stream(steps) => Ok(Box::new(ScriptedStream {
                steps: steps.into(),
                counters: Arc::clone(&self.counters),
            })),
        }
    }
}

struct ScriptedStream {
    steps: VecDeque<Step>,
    counters: Arc<Counters>,
}

#[async_trait]
impl FrameStream for ScriptedStream {
    async fn read(&mut self) -> Result<Frame, ReadError> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        match self.steps.pop_front().unwrap_or(Step::Invalid) {
            Step::Valid => Ok(valid_frame()),
            Step::Invalid => Ok(invalid_frame()),
            Step::Error => Err(ReadError::Request("scripted read error".to_string())),
            Step::Hang => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}
