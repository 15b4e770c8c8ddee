use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::broker::message::Message;
use crate::broker::subscriber::{Subscriber, SubscriberId};

type Subscribers = HashMap<SubscriberId, Arc<Subscriber>>;

/// The in-process registry routing published messages to topic subscribers.
///
/// The broker maintains a mapping of topics to subscribers and a global
/// subscriber table. A subscriber appears under a topic key exactly when it
/// holds that topic in its own topic set; publishing to a topic nobody
/// subscribed to is a no-op.
#[derive(Debug, Default)]
pub struct Broker {
    topics: RwLock<HashMap<String, Subscribers>>,
    subscribers: RwLock<Subscribers>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber to a topic. Idempotent: subscribing the same
    /// subscriber twice leaves a single entry.
    pub fn subscribe(&self, subscriber: &Arc<Subscriber>, topic: &str) {
        let mut topics = self.topics.write().unwrap();
        topics
            .entry(topic.to_string())
            .or_default()
            .insert(subscriber.id().to_string(), Arc::clone(subscriber));

        self.subscribers
            .write()
            .unwrap()
            .insert(subscriber.id().to_string(), Arc::clone(subscriber));

        subscriber.add_topic(topic);
    }

    /// Removes a subscriber from a topic. Unknown topics are ignored.
    pub fn unsubscribe(&self, subscriber: &Arc<Subscriber>, topic: &str) {
        if let Some(subs) = self.topics.write().unwrap().get_mut(topic) {
            subs.remove(subscriber.id());
        }

        subscriber.remove_topic(topic);
    }

    /// Publishes a payload to every subscriber currently registered for the
    /// topic.
    ///
    /// Each delivery runs on its own task, so one slow or full subscriber
    /// queue cannot block the publisher or delivery to the others. Inactive
    /// subscribers are skipped; the rest of the fan-out proceeds.
    pub fn publish(&self, topic: &str, body: Value) {
        let targets: Vec<Arc<Subscriber>> = {
            let topics = self.topics.read().unwrap();
            match topics.get(topic) {
                Some(subs) => subs.values().cloned().collect(),
                None => return,
            }
        };

        if targets.is_empty() {
            return;
        }

        let msg = Message::new(topic, body);
        for subscriber in targets {
            if !subscriber.active() {
                debug!(subscriber = subscriber.id(), topic, "skipping inactive subscriber");
                continue;
            }

            let msg = msg.clone();
            tokio::spawn(async move {
                if !subscriber.signal(msg).await {
                    debug!(subscriber = subscriber.id(), "message dropped, subscriber queue closed");
                }
            });
        }
    }

    /// Unsubscribes a subscriber from every topic it is registered under,
    /// drops it from the subscriber table and destroys it. The subscriber's
    /// message stream ends once its pending queue drains.
    pub async fn remove_subscriber(&self, subscriber: &Arc<Subscriber>) {
        for topic in subscriber.topics() {
            self.unsubscribe(subscriber, &topic);
        }

        self.subscribers.write().unwrap().remove(subscriber.id());

        subscriber.destruct().await;
    }

    #[cfg(test)]
    pub(crate) fn topic_subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .unwrap()
            .get(topic)
            .map_or(0, HashMap::len)
    }
}
