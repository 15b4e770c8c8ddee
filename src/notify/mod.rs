//! Webhook notification pipeline.
//!
//! Bridges the in-process message bus to externally registered HTTP callback
//! endpoints. Registration goes through [`manager::NotificationManager`],
//! which verifies callback ownership with a challenge handshake before a
//! subscriber receives any traffic; verified subscribers are served by one
//! [`topic_handler::TopicHandler`] per topic, delivering signed notifications
//! over [`webhook::WebhookClient`].

pub mod manager;
pub mod model;
pub mod topic_handler;
pub mod webhook;

pub use manager::NotificationManager;
pub use model::{NotificationSubscriber, VerificationStatus};
