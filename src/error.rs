//! Crate-level error types.
//!
//! [`StreamerError`] covers the failures that can end a session
//! (configuration, WebSocket, JSON encoding of outbound requests, and a
//! strict-mode ordering anomaly). Per-message failures have their own
//! types next to the component that raises them
//! ([`FrameError`](crate::frame::FrameError),
//! [`ParseError`](crate::parser::ParseError)) and are logged and discarded
//! instead of being propagated.

use crate::aggregator::OrderingAnomaly;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StreamerError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum StreamerError {
    /// An environment variable held a value that could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// A WebSocket operation (connect, send, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON serialization of an outbound request failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A tick went backwards in time while the strict ordering policy was active.
    #[error("ordering anomaly: {0}")]
    Ordering(#[from] OrderingAnomaly),
}
