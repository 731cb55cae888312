use chrono::Utc;
use sled::Db;
use tracing::warn;

use crate::broker::message::Message;

/// Sled-backed per-topic message log with TTL-based cleanup.
///
/// One sled tree per topic id; keys are `<timestamp_be><message_id>` so a
/// range scan returns messages in publish order and expired entries cluster
/// at the front.
#[derive(Clone)]
pub struct MessageLog {
    db: Db,
    ttl_seconds: Option<i64>,
}

impl MessageLog {
    pub fn open(path: &str, ttl_seconds: Option<i64>) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        Ok(Self { db, ttl_seconds })
    }

    /// Appends a published message. Log failures are reported, never raised:
    /// the log is advisory and must not fail a publish.
    pub fn append(&self, msg: &Message) {
        let serialized = match serde_json::to_vec(msg) {
            Ok(data) => data,
            Err(e) => {
                warn!(topic = %msg.topic_id, error = %e, "failed to serialize message for log");
                return;
            }
        };
        let mut key = msg.timestamp.to_be_bytes().to_vec();
        key.extend_from_slice(msg.message_id.as_bytes());
        let result = self
            .db
            .open_tree(msg.topic_id.as_bytes())
            .and_then(|tree| tree.insert(key, serialized));
        if let Err(e) = result {
            warn!(topic = %msg.topic_id, error = %e, "failed to append message to log");
        }
    }

    /// Returns logged messages for a topic in publish order, dropping
    /// expired entries first when a TTL is configured.
    pub fn messages_for(&self, topic_id: &str) -> Vec<Message> {
        self.cleanup_expired(topic_id);
        let tree = match self.db.open_tree(topic_id.as_bytes()) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(topic = topic_id, error = %e, "failed to open message log tree");
                return Vec::new();
            }
        };
        tree.iter()
            .filter_map(|res| res.ok())
            .filter_map(|(_, val)| serde_json::from_slice(&val).ok())
            .collect()
    }

    fn cleanup_expired(&self, topic_id: &str) {
        let Some(ttl) = self.ttl_seconds else {
            return;
        };
        let expiry = Utc::now().timestamp() - ttl;
        let tree = match self.db.open_tree(topic_id.as_bytes()) {
            Ok(tree) => tree,
            Err(_) => return,
        };
        let expired: Vec<_> = tree
            .iter()
            .filter_map(|res| res.ok())
            .take_while(|(key, _)| {
                key.len() >= 8
                    && i64::from_be_bytes(key[..8].try_into().unwrap_or([0; 8])) < expiry
            })
            .map(|(key, _)| key)
            .collect();
        for key in expired {
            let _ = tree.remove(key);
        }
    }
}

impl std::fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageLog")
            .field("db", &"sled::Db")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
