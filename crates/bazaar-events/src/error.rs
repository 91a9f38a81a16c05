//! Publish error types.
//!
//! A `PublishError` never escapes past the service layer: the caller logs
//! it and continues, because events are notifications, not writes.

use std::time::Duration;

use thiserror::Error;

/// Errors from a single publish attempt.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The broker could not be reached or refused the command.
    #[error("broker error: {0}")]
    Broker(#[from] redis::RedisError),

    /// Connect-and-publish did not finish within the configured bound.
    #[error("publish timed out after {0:?}")]
    Timeout(Duration),

    /// The event payload could not be serialized.
    #[error("failed to encode event payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;
