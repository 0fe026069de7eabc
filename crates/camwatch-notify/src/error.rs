//! Notification error types.

use thiserror::Error;

/// Failure inside a notification transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("destination rejected alert with status {0}")]
    Rejected(u16),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Failure to deliver an alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("alert #{seq} via {channel} failed: {source}")]
    Transport {
        seq: u64,
        channel: &'static str,
        #[source]
        source: TransportError,
    },
}
