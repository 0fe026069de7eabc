//! Frame source error types.
//!
//! The probe folds all of these into "attempt failed"; the variants exist
//! for logging.

use thiserror::Error;

/// A frame source could not be opened for an endpoint.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("unsupported scheme in {0}")]
    UnsupportedScheme(String),

    #[error("connection to {endpoint} failed: {reason}")]
    Connect { endpoint: String, reason: String },
}

/// An open source failed to deliver a frame.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("frame of {0} bytes exceeds limit")]
    TooLarge(usize),

    #[error("failed to decode frame: {0}")]
    Decode(String),

    #[error("source closed")]
    Closed,
}
