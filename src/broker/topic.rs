use chrono::{DateTime, Utc};

use crate::utils::error::BrokerError;

pub type TopicId = String;

/// A named pub/sub channel.
///
/// The id is the opaque external handle (ARN-equivalent); it is derived from
/// the name, unique among live topics, and immutable once created.
#[derive(Debug, Clone)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Owns topic identity and existence.
///
/// Topics are kept in insertion order so `list` is stable. `create` is
/// idempotent by name: re-creating an existing name returns the live topic
/// unchanged rather than erroring or minting a second id.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: Vec<Topic>,
}

/// Valid topic names: 1-256 chars of alphanumerics, hyphen, underscore.
fn valid_topic_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 256
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn topic_id_for(name: &str) -> TopicId {
    format!("local:topic:{name}")
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str) -> Result<Topic, BrokerError> {
        if !valid_topic_name(name) {
            return Err(BrokerError::InvalidArgument(format!(
                "topic name {name:?} must be 1-256 characters of [A-Za-z0-9_-]"
            )));
        }
        if let Some(existing) = self.topics.iter().find(|t| t.name == name) {
            return Ok(existing.clone());
        }
        let topic = Topic {
            id: topic_id_for(name),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.topics.push(topic.clone());
        Ok(topic)
    }

    pub fn list(&self) -> Vec<Topic> {
        self.topics.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn delete(&mut self, id: &str) -> Result<Topic, BrokerError> {
        match self.topics.iter().position(|t| t.id == id) {
            Some(idx) => Ok(self.topics.remove(idx)),
            None => Err(BrokerError::TopicNotFound(id.to_string())),
        }
    }
}
