use chrono::Utc;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, error};
use uuid::Uuid;

use crate::broker::message::Message;
use crate::notify::model::{NotificationBody, NotificationPayload};
use crate::notify::webhook::WebhookClient;

/// Per-topic fan-out engine.
///
/// Owns the receiving half of one bus subscriber's message queue and the
/// list of verified webhook destinations for that topic. The notify loop
/// runs for the lifetime of the process and terminates only when the bus
/// destroys the underlying subscriber, closing the queue.
#[derive(Debug)]
pub struct TopicHandler {
    topic: String,
    events: Mutex<mpsc::Receiver<Message>>,
    clients: RwLock<Vec<WebhookClient>>,
}

impl TopicHandler {
    pub(crate) fn new(topic: String, events: mpsc::Receiver<Message>) -> Self {
        Self {
            topic,
            events: Mutex::new(events),
            clients: RwLock::new(Vec::new()),
        }
    }

    /// Appends a verified subscriber. Ids are generated, so no further dedup
    /// is enforced here.
    pub(crate) async fn add_subscriber(&self, client: WebhookClient) {
        self.clients.write().await.push(client);
    }

    #[cfg(test)]
    pub(crate) async fn subscriber_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Consumes the topic's message stream and forwards every message to all
    /// current subscribers, in snapshot order, one at a time.
    ///
    /// A failed delivery is logged and skipped; there is no retry. The read
    /// lock on the subscriber list is held for the whole broadcast so an
    /// appender cannot race mid-iteration.
    pub(crate) async fn notify(&self) {
        let mut events = self.events.lock().await;

        while let Some(msg) = events.recv().await {
            let payload = NotificationPayload {
                message_id: Uuid::new_v4().to_string(),
                timestamp: Utc::now(),
                body: NotificationBody {
                    data: msg.body,
                    created_at: msg.created_at,
                },
            };

            let clients = self.clients.read().await;
            for client in clients.iter() {
                if let Err(err) = client.send_notification(&payload).await {
                    error!(
                        subscriber = %client.subscriber().id,
                        message_id = %payload.message_id,
                        error = %err,
                        "failed to deliver notification"
                    );
                    continue;
                }

                debug!(
                    subscriber = %client.subscriber().id,
                    message_id = %payload.message_id,
                    topic = %self.topic,
                    "notification sent"
                );
            }
        }

        debug!(topic = %self.topic, "event stream closed, notify loop stopped");
    }
}
