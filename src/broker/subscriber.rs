use std::collections::HashSet;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::broker::message::Message;

/// Capacity of each subscriber's pending-message queue.
pub const MESSAGE_BUFFER: usize = 100;

pub type SubscriberId = String;

/// One listener attached to zero or more topics.
///
/// A subscriber owns the sending half of a bounded message queue; the
/// receiving half is handed out once at construction and consumed by
/// whatever drives the subscriber (e.g. a topic handler's notify loop).
///
/// The sender lives behind an async mutex so that the active check and the
/// channel send happen as one synchronized step: once `destruct` has taken
/// the sender, no further message can be enqueued and `signal` becomes a
/// silent no-op.
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    sender: Mutex<Option<mpsc::Sender<Message>>>,
    topics: RwLock<HashSet<String>>,
    active: AtomicBool,
}

impl Subscriber {
    /// Creates a subscriber and returns it together with the receiving half
    /// of its message queue.
    pub fn new() -> (Arc<Self>, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(MESSAGE_BUFFER);
        let subscriber = Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            sender: Mutex::new(Some(tx)),
            topics: RwLock::new(HashSet::new()),
            active: AtomicBool::new(true),
        });

        (subscriber, rx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn add_topic(&self, topic: &str) {
        self.topics.write().unwrap().insert(topic.to_string());
    }

    pub fn remove_topic(&self, topic: &str) {
        self.topics.write().unwrap().remove(topic);
    }

    /// Snapshot of the topics this subscriber is registered under.
    pub fn topics(&self) -> Vec<String> {
        self.topics.read().unwrap().iter().cloned().collect()
    }

    /// Enqueues a message for this subscriber.
    ///
    /// Blocks the calling task while the queue is full. Returns false if the
    /// subscriber was destructed, meaning the message was dropped.
    pub async fn signal(&self, msg: Message) -> bool {
        let sender = self.sender.lock().await;
        match sender.as_ref() {
            Some(tx) => tx.send(msg).await.is_ok(),
            None => false,
        }
    }

    /// Permanently deactivates the subscriber and closes its queue.
    ///
    /// The receiving half observes the close once all pending messages have
    /// been drained.
    pub async fn destruct(&self) {
        self.active.store(false, Ordering::Release);
        self.sender.lock().await.take();
    }
}
