use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::broker::{Broker, Subscriber};
use crate::config::NotifySettings;
use crate::notify::model::{NotificationSubscriber, VerificationStatus};
use crate::notify::topic_handler::TopicHandler;
use crate::notify::webhook::WebhookClient;
use crate::utils::error::NotifyError;

/// Capacity of the pending-verification queue.
pub const PENDING_VERIFICATION_BUFFER: usize = 100;

/// Owns the webhook subscription workflow.
///
/// Built with a fixed set of topics: for each one it registers a bus
/// subscriber with the broker and creates a [`TopicHandler`]. Registration
/// requests return a pending record immediately; a single background worker
/// performs the challenge handshake and promotes verified subscribers into
/// the matching handler.
#[derive(Debug)]
pub struct NotificationManager {
    handlers: HashMap<String, Arc<TopicHandler>>,
    pending_tx: mpsc::Sender<WebhookClient>,
    pending_rx: std::sync::Mutex<Option<mpsc::Receiver<WebhookClient>>>,
    http: reqwest::Client,
}

impl NotificationManager {
    /// Registers one bus subscriber and topic handler per configured topic.
    ///
    /// Fails only if the shared HTTP client cannot be built.
    pub fn new(broker: &Arc<Broker>, settings: &NotifySettings) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        let (pending_tx, pending_rx) = mpsc::channel(PENDING_VERIFICATION_BUFFER);

        let mut handlers = HashMap::new();
        for topic in &settings.topics {
            let (subscriber, events) = Subscriber::new();
            broker.subscribe(&subscriber, topic);
            handlers.insert(
                topic.clone(),
                Arc::new(TopicHandler::new(topic.clone(), events)),
            );
        }

        Ok(Self {
            handlers,
            pending_tx,
            pending_rx: std::sync::Mutex::new(Some(pending_rx)),
            http,
        })
    }

    /// Launches the verification worker and every topic handler's notify
    /// loop. Must be called once after construction; events published before
    /// this are absorbed only by the bus subscribers' bounded queues.
    pub fn start(&self) {
        let Some(pending_rx) = self.pending_rx.lock().unwrap().take() else {
            warn!("notification manager already started");
            return;
        };

        let handlers = self.handlers.clone();
        tokio::spawn(async move {
            Self::handle_pending_verifications(handlers, pending_rx).await;
        });

        for handler in self.handlers.values() {
            let handler = Arc::clone(handler);
            tokio::spawn(async move {
                handler.notify().await;
            });
        }
    }

    /// Registers a webhook destination for a topic.
    ///
    /// Returns the pending record right away; verification happens
    /// asynchronously and the caller is not informed of its outcome. An
    /// empty secret means the subscriber opted out of signing.
    pub async fn subscribe(
        &self,
        topic: &str,
        callback: &str,
        secret: Option<String>,
    ) -> Result<NotificationSubscriber, NotifyError> {
        if !self.handlers.contains_key(topic) {
            return Err(NotifyError::UnknownTopic(topic.to_string()));
        }

        let subscriber = NotificationSubscriber {
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            callback_url: callback.to_string(),
            secret: secret.filter(|s| !s.is_empty()),
            status: VerificationStatus::Pending,
            created_at: Utc::now(),
        };

        let client = WebhookClient::new(self.http.clone(), subscriber.clone());

        debug!(
            id = %subscriber.id,
            topic = %subscriber.topic,
            callback = %subscriber.callback_url,
            status = %subscriber.status,
            "pushed to pending verifications"
        );
        self.pending_tx
            .send(client)
            .await
            .map_err(|_| NotifyError::QueueClosed)?;

        Ok(subscriber)
    }

    /// Consumes the pending queue serially: verifies each callback and hands
    /// verified subscribers to their topic handler. Failures are logged and
    /// dropped; the registrant already received its pending response.
    async fn handle_pending_verifications(
        handlers: HashMap<String, Arc<TopicHandler>>,
        mut pending_rx: mpsc::Receiver<WebhookClient>,
    ) {
        while let Some(mut client) = pending_rx.recv().await {
            if let Err(err) = client.verify_subscription().await {
                error!(
                    id = %client.subscriber().id,
                    topic = %client.subscriber().topic,
                    callback = %client.subscriber().callback_url,
                    error = %err,
                    "cannot verify subscription"
                );
                continue;
            }

            let Some(handler) = handlers.get(&client.subscriber().topic) else {
                continue;
            };

            debug!(
                id = %client.subscriber().id,
                topic = %client.subscriber().topic,
                callback = %client.subscriber().callback_url,
                "verified subscription"
            );
            handler.add_subscriber(client).await;
        }
    }

    #[cfg(test)]
    pub(crate) fn handler(&self, topic: &str) -> Option<&Arc<TopicHandler>> {
        self.handlers.get(topic)
    }
}
