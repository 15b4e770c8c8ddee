//! Error types used across the notification pipeline.
//!
//! Registration errors surface synchronously to the caller; everything that
//! happens inside the async verification and delivery pipelines is terminal
//! for that one operation and only observable via logs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// The requested topic was not registered when the manager was built.
    #[error("topic {0} not available")]
    UnknownTopic(String),

    /// The callback answered the verification request with a different
    /// challenge than the one sent.
    #[error("invalid challenge provided: {received}, expected: {expected}")]
    ChallengeMismatch { expected: String, received: String },

    /// The callback rejected the verification request.
    #[error("verification request failed with status {0}")]
    VerificationStatus(u16),

    /// The callback rejected a notification delivery.
    #[error("notification rejected with status {0}")]
    DeliveryStatus(u16),

    /// Transport-level failure talking to the callback endpoint.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Payload serialization failure. Defensive only; payload shapes are
    /// fixed, so this should not occur in practice.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    /// The pending-verification queue was closed before the subscription
    /// could be enqueued.
    #[error("verification queue closed")]
    QueueClosed,
}
