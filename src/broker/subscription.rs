use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::broker::topic::TopicId;
use crate::utils::error::BrokerError;

pub type SubscriptionId = String;

/// How a subscription's endpoint receives messages.
///
/// - `Queue`: append into a named in-process delivery queue, drained by
///   `receive` calls.
/// - `Push`: forward to a connected WebSocket session; the endpoint is the
///   session's client id.
/// - `Http`: POST the message as JSON to the endpoint URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Queue,
    Push,
    Http,
}

impl Protocol {
    pub fn parse(tag: &str) -> Result<Self, BrokerError> {
        match tag {
            "queue" => Ok(Protocol::Queue),
            "push" => Ok(Protocol::Push),
            "http" => Ok(Protocol::Http),
            other => Err(BrokerError::InvalidArgument(format!(
                "unknown protocol {other:?}, expected one of: queue, push, http"
            ))),
        }
    }
}

/// A binding of a delivery endpoint to a topic.
///
/// Owned by its topic: deleting the topic deletes the subscription.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub topic_id: TopicId,
    pub protocol: Protocol,
    pub endpoint: String,
}

/// Maps topics to subscriber endpoints.
///
/// The index never checks topic existence itself; the engine does that under
/// its lock before calling in, so the owning-topic invariant holds.
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription, or refreshes the existing one if the same
    /// (topic, protocol, endpoint) triple is already bound. Re-subscribing
    /// mints a fresh subscription id either way.
    pub fn add(
        &mut self,
        topic_id: &str,
        protocol: Protocol,
        endpoint: &str,
    ) -> Result<Subscription, BrokerError> {
        if endpoint.is_empty() {
            return Err(BrokerError::InvalidArgument(
                "endpoint must be non-empty".to_string(),
            ));
        }
        let id = format!("{}:{}", topic_id, Uuid::new_v4());
        if let Some(existing) = self.subscriptions.iter_mut().find(|s| {
            s.topic_id == topic_id && s.protocol == protocol && s.endpoint == endpoint
        }) {
            existing.id = id;
            return Ok(existing.clone());
        }
        let subscription = Subscription {
            id,
            topic_id: topic_id.to_string(),
            protocol,
            endpoint: endpoint.to_string(),
        };
        self.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    pub fn remove(&mut self, subscription_id: &str) -> Result<Subscription, BrokerError> {
        match self
            .subscriptions
            .iter()
            .position(|s| s.id == subscription_id)
        {
            Some(idx) => Ok(self.subscriptions.remove(idx)),
            None => Err(BrokerError::SubscriptionNotFound(
                subscription_id.to_string(),
            )),
        }
    }

    /// Drops every subscription owned by `topic_id`, returning what was removed.
    pub fn remove_topic(&mut self, topic_id: &str) -> Vec<Subscription> {
        let (removed, kept) = self
            .subscriptions
            .drain(..)
            .partition(|s| s.topic_id == topic_id);
        self.subscriptions = kept;
        removed
    }

    pub fn for_topic(&self, topic_id: &str) -> Vec<Subscription> {
        self.subscriptions
            .iter()
            .filter(|s| s.topic_id == topic_id)
            .cloned()
            .collect()
    }

    pub fn list(&self) -> Vec<Subscription> {
        self.subscriptions.clone()
    }
}
