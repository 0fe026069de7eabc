//! camwatch-health — liveness probing for networked cameras.
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//!   ├── per-cycle JoinSet, one task per camera
//!   │   └── CameraProbe::probe()
//!   │         ├── FrameSource::open()  (bounded by open_timeout)
//!   │         ├── FrameStream::read()  (bounded by the read window)
//!   │         └── FrameValidator::validate() → luma variance ≥ threshold
//!   ├── StatusTracker::record()  in configured camera order
//!   └── AlertDispatcher::dispatch()  for every transition
//! ```
//!
//! # Probe protocol
//!
//! A camera gets `retries` attempts. An attempt opens a source and keeps
//! reading for at most `read_window`, pausing `poll_interval` between
//! reads; the first valid frame ends the probe as online. A source that
//! fails to open costs `open_backoff` before the next attempt. Open
//! failures, read errors, timeouts and degenerate frames all count the
//! same: only running out of attempts marks a camera offline.
//!
//! # Sources
//!
//! [`SchemeSource`] routes `http://` endpoints to [`HttpSnapshotSource`]
//! and `rtsp://` / `rtsps://` endpoints to [`RtspSource`], which decodes
//! through an ffmpeg child process.

pub mod error;
pub mod frame;
pub mod http_source;
pub mod probe;
pub mod rtsp_source;
pub mod scheduler;
pub mod source;
pub mod validator;

#[cfg(test)]
mod testing;

pub use error::{OpenError, ReadError};
pub use frame::{Frame, FrameSource, FrameStream, PixelFormat};
pub use http_source::HttpSnapshotSource;
pub use probe::{AttemptResult, CameraProbe};
pub use rtsp_source::RtspSource;
pub use scheduler::Scheduler;
pub use source::SchemeSource;
pub use validator::FrameValidator;
