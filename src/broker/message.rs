use chrono::{DateTime, Utc};
use serde_json::Value;

/// Represents a published message in the bus.
///
/// A message consists of the topic it was published under, an opaque JSON
/// payload, and the timestamp taken at publish time. The bus never inspects
/// the payload; it is handed to subscribers exactly as published.
#[derive(Debug, Clone)]
pub struct Message {
    pub topic: String,
    pub body: Value,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Wraps a payload into a message stamped with the current time.
    pub fn new(topic: &str, body: Value) -> Self {
        Self {
            topic: topic.to_string(),
            body,
            created_at: Utc::now(),
        }
    }
}
