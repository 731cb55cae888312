use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A published message during fan-out.
///
/// A message is transient: it exists from the moment a publish is accepted
/// until every delivery attempt has finished. It carries the owning topic id,
/// the payload, a fresh unique message id, and the publish timestamp
/// (Unix seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    pub topic_id: String,
    pub payload: String,
    pub timestamp: i64,
}

impl Message {
    /// Stamps a new message for `topic_id` with a fresh id and the current time.
    pub fn new(topic_id: &str, payload: String) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            topic_id: topic_id.to_string(),
            payload,
            timestamp: Utc::now().timestamp(),
        }
    }
}
