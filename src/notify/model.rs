use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Header carrying the unique id of a delivered notification, usable by the
/// receiver for duplicate detection.
pub const HEADER_MESSAGE_ID: &str = "Notification-Message-Id";
/// Header carrying the delivery timestamp as an RFC3339 string with
/// nanosecond precision.
pub const HEADER_MESSAGE_TIMESTAMP: &str = "Notification-Message-Timestamp";
/// Header distinguishing verification requests from notifications.
pub const HEADER_MESSAGE_TYPE: &str = "Notification-Message-Type";
/// Header carrying the HMAC signature, present only when the subscriber
/// registered a secret.
pub const HEADER_MESSAGE_SIGNATURE: &str = "Notification-Message-Signature";

pub const MESSAGE_TYPE_VERIFICATION: &str = "webhook_callback_verification";
pub const MESSAGE_TYPE_NOTIFICATION: &str = "notification";

/// Lifecycle state of a webhook subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Registered but the challenge handshake has not completed yet.
    #[serde(rename = "verification_pending")]
    Pending,
    /// Callback ownership proven; the subscriber receives notifications.
    Enabled,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Pending => f.write_str("verification_pending"),
            VerificationStatus::Enabled => f.write_str("enabled"),
        }
    }
}

/// One externally registered webhook destination.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationSubscriber {
    pub id: String,
    pub topic: String,
    pub callback_url: String,
    /// Optional signing key; when set, deliveries carry a
    /// `Notification-Message-Signature` header.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

/// Body of the verification request sent to a freshly registered callback.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationPayload {
    pub id: String,
    pub challenge: String,
    pub callback: String,
    pub created_at: DateTime<Utc>,
}

/// JSON body of a delivered notification. The message id and timestamp
/// travel only as headers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

/// A notification as built once per bus message by a topic handler's notify
/// loop; delivered to every verified subscriber of that topic.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub body: NotificationBody,
}
