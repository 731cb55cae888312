//! The `queues` module holds the named in-memory delivery queues that back
//! `queue`-protocol subscriptions.
//!
//! Queues exist independently of topics: a topic delete leaves its queues
//! (and any undrained messages) in place. A queue is created when the first
//! subscription names it; `receive` on a name nobody ever subscribed is
//! NotFound.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::broker::message::Message;
use crate::utils::error::BrokerError;

/// One message as it sits in a delivery queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveredMessage {
    pub message_id: String,
    pub topic_id: String,
    pub payload: String,
    pub timestamp: i64,
}

impl From<&Message> for DeliveredMessage {
    fn from(msg: &Message) -> Self {
        Self {
            message_id: msg.message_id.clone(),
            topic_id: msg.topic_id.clone(),
            payload: msg.payload.clone(),
            timestamp: msg.timestamp,
        }
    }
}

/// All delivery queues, behind one lock. Queue operations are short
/// (push/pop on a VecDeque) so a single Mutex is enough.
#[derive(Debug)]
pub struct QueueStore {
    queues: Mutex<HashMap<String, VecDeque<DeliveredMessage>>>,
    max_depth: usize,
}

impl QueueStore {
    pub fn new(max_depth: usize) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            max_depth,
        }
    }

    /// Creates the queue if it does not exist yet. Idempotent.
    pub fn ensure(&self, name: &str) {
        let mut queues = self.queues.lock().unwrap();
        queues.entry(name.to_string()).or_default();
    }

    /// Appends a delivered message, creating the queue on first use.
    /// When the queue is at capacity the oldest message is dropped.
    pub fn push(&self, name: &str, msg: DeliveredMessage) {
        let mut queues = self.queues.lock().unwrap();
        let queue = queues.entry(name.to_string()).or_default();
        if queue.len() >= self.max_depth {
            queue.pop_front();
            warn!(queue = name, "queue at capacity, dropping oldest message");
        }
        queue.push_back(msg);
    }

    /// Pops up to `max` messages from the front of the queue.
    pub fn receive(
        &self,
        name: &str,
        max: usize,
    ) -> Result<Vec<DeliveredMessage>, BrokerError> {
        let mut queues = self.queues.lock().unwrap();
        let queue = queues
            .get_mut(name)
            .ok_or_else(|| BrokerError::QueueNotFound(name.to_string()))?;
        let take = max.min(queue.len());
        Ok(queue.drain(..take).collect())
    }

    pub fn depth(&self, name: &str) -> Option<usize> {
        let queues = self.queues.lock().unwrap();
        queues.get(name).map(|q| q.len())
    }
}

#[cfg(test)]
mod tests;
