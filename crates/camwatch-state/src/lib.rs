//! camwatch-state — in-memory health state for every monitored camera.
//!
//! The [`StatusTracker`] is the single owner of mutable monitoring state:
//! the last classified [`HealthState`] per camera, the append-only list of
//! [`TransitionEvent`]s, and the sequence counter that numbers them.
//!
//! # State machine
//!
//! ```text
//!            ┌──────── online ───────┐
//! Unknown ───┤                       ├── Online ⇄ Offline
//!            └──────── offline ──────┘
//! ```
//!
//! Every arrow emits exactly one event. Recording the state a camera is
//! already in is a no-op, and nothing ever returns to `Unknown`.
//!
//! The tracker is `Clone` + `Send` + `Sync` (backed by `Arc<RwLock<..>>`)
//! and can be shared between the scheduler, the dispatcher and the HTTP
//! status surface. State lives for the process lifetime only.

pub mod tracker;
pub mod types;

pub use tracker::StatusTracker;
pub use types::*;
