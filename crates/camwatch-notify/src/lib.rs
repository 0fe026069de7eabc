//! camwatch-notify — turns state transitions into alerts.
//!
//! # Architecture
//!
//! ```text
//! AlertDispatcher
//!   ├── render_alert(event, history) → AlertPayload (HTML)
//!   │     └── render_table(history): one row per TransitionEvent
//!   └── Arc<dyn NotificationChannel>
//!         ├── LogChannel      (writes the alert to the log)
//!         ├── WebhookChannel  (POSTs JSON over HTTP/1)
//!         └── SmtpChannel     (HTML email via STARTTLS relay)
//! ```
//!
//! Every alert restates the whole change history up to the triggering
//! event, not just the delta.

pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod render;
pub mod smtp;
pub mod webhook;

pub use channel::{LogChannel, NotificationChannel};
pub use dispatcher::AlertDispatcher;
pub use error::{NotifyError, TransportError};
pub use render::{render_alert, render_table, AlertPayload};
pub use smtp::{SmtpChannel, SmtpSettings};
pub use webhook::WebhookChannel;
