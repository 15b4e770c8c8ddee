use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use sha2::Sha256;
use uuid::Uuid;

use crate::notify::model::{
    HEADER_MESSAGE_ID, HEADER_MESSAGE_SIGNATURE, HEADER_MESSAGE_TIMESTAMP, HEADER_MESSAGE_TYPE,
    MESSAGE_TYPE_NOTIFICATION, MESSAGE_TYPE_VERIFICATION, NotificationPayload,
    NotificationSubscriber, VerificationPayload, VerificationStatus,
};
use crate::utils::error::NotifyError;

type HmacSha256 = Hmac<Sha256>;

/// Outbound HTTP client for one webhook subscriber: performs the challenge
/// handshake and delivers signed notifications to the callback URL.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    subscriber: NotificationSubscriber,
}

impl WebhookClient {
    pub fn new(http: reqwest::Client, subscriber: NotificationSubscriber) -> Self {
        Self { http, subscriber }
    }

    pub fn subscriber(&self) -> &NotificationSubscriber {
        &self.subscriber
    }

    /// Proves that the registrant controls the callback endpoint.
    ///
    /// Sends a fresh random challenge to the callback URL; the endpoint must
    /// answer with HTTP 200 and echo the challenge back as plain text.
    /// Anything else fails verification. On success the subscriber is marked
    /// enabled.
    pub async fn verify_subscription(&mut self) -> Result<(), NotifyError> {
        let payload = VerificationPayload {
            id: self.subscriber.id.clone(),
            challenge: Uuid::new_v4().to_string(),
            callback: self.subscriber.callback_url.clone(),
            created_at: self.subscriber.created_at,
        };

        let resp = self
            .http
            .post(&payload.callback)
            .header(HEADER_MESSAGE_TYPE, MESSAGE_TYPE_VERIFICATION)
            .json(&payload)
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(NotifyError::VerificationStatus(resp.status().as_u16()));
        }

        let echoed = resp.text().await?;
        if echoed != payload.challenge {
            return Err(NotifyError::ChallengeMismatch {
                expected: payload.challenge,
                received: echoed,
            });
        }

        self.subscriber.status = VerificationStatus::Enabled;
        Ok(())
    }

    /// Delivers one notification to the callback URL.
    ///
    /// The message id and timestamp travel as headers; the body carries only
    /// the event data and its creation time. When the subscriber registered
    /// a secret, the request is signed over the exact body bytes sent.
    pub async fn send_notification(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let body = serde_json::to_string(&payload.body)?;

        let mut req = self
            .http
            .post(&self.subscriber.callback_url)
            .header(HEADER_MESSAGE_ID, &payload.message_id)
            .header(
                HEADER_MESSAGE_TIMESTAMP,
                payload.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            )
            .header(HEADER_MESSAGE_TYPE, MESSAGE_TYPE_NOTIFICATION)
            .header(CONTENT_TYPE, "application/json");

        if let Some(secret) = &self.subscriber.secret {
            let signature = create_signature(secret, &payload.message_id, payload.timestamp, &body);
            req = req.header(HEADER_MESSAGE_SIGNATURE, signature);
        }

        let resp = req.body(body).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(NotifyError::DeliveryStatus(resp.status().as_u16()));
        }

        Ok(())
    }
}

/// Computes the notification signature: HMAC-SHA256 keyed by the subscriber
/// secret over `messageId + unixSeconds + body`, hex-encoded and prefixed
/// with `sha256=`. The receiver recomputes it from the headers and body to
/// authenticate the sender.
pub fn create_signature(
    secret: &str,
    message_id: &str,
    timestamp: DateTime<Utc>,
    body: &str,
) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");

    mac.update(message_id.as_bytes());
    mac.update(timestamp.timestamp().to_string().as_bytes());
    mac.update(body.as_bytes());

    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
