use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notify::model::{NotificationSubscriber, VerificationStatus};

/// Subscription registration request.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    /// Topic to subscribe to.
    #[serde(rename = "type")]
    pub topic: String,
    /// HTTP endpoint notifications are delivered to. Must answer the
    /// verification challenge before any notification is sent.
    pub callback: String,
    /// Optional signing secret for the delivery signature header.
    #[serde(default)]
    pub secret: Option<String>,
}

/// Subscription registration response. The status is always
/// `verification_pending` at this point; verification runs asynchronously.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub topic: String,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationSubscriber> for SubscribeResponse {
    fn from(sub: NotificationSubscriber) -> Self {
        Self {
            id: sub.id,
            topic: sub.topic,
            status: sub.status,
            created_at: sub.created_at,
        }
    }
}
