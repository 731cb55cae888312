use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::broker::dispatcher::DeliveryTarget;
use crate::broker::message::Message;
use crate::broker::subscription::{Protocol, Subscription, SubscriptionIndex};
use crate::broker::topic::{Topic, TopicRegistry};
use crate::client::Client;
use crate::queues::QueueStore;
use crate::utils::error::BrokerError;

/// The broker core: topic registry, subscription index, and the map of
/// connected sessions, behind one lock.
///
/// Holding registry and index under the same Mutex makes every mutation
/// mutually exclusive, so a delete_topic racing a subscribe resolves to
/// whichever commits first: a subscribe that loses sees NotFound, and no
/// dangling subscription can be left behind.
///
/// Publishing splits in two: `prepare_publish` validates the topic and
/// snapshots delivery targets under the lock; the dispatcher then fans out
/// without it, so slow endpoints never hold up registry operations.
#[derive(Debug)]
pub struct Broker {
    topics: TopicRegistry,
    subscriptions: SubscriptionIndex,
    clients: HashMap<String, Client>,
    queues: Arc<QueueStore>,
}

impl Broker {
    pub fn new(queues: Arc<QueueStore>) -> Self {
        Self {
            topics: TopicRegistry::new(),
            subscriptions: SubscriptionIndex::new(),
            clients: HashMap::new(),
            queues,
        }
    }

    /// Registers a newly connected session.
    pub fn register_client(&mut self, client: Client) {
        debug!(client = %client.id, "client connected");
        self.clients.insert(client.id.clone(), client);
    }

    /// Drops a disconnected session. Its `push` subscriptions stay in the
    /// index; deliveries to them fail as unreachable until unsubscribed.
    pub fn remove_client(&mut self, client_id: &str) {
        debug!(client = client_id, "client disconnected");
        self.clients.remove(client_id);
    }

    /// Creates a topic, idempotently by name.
    pub fn create_topic(&mut self, name: &str) -> Result<Topic, BrokerError> {
        let topic = self.topics.create(name)?;
        info!(topic = %topic.id, "topic created");
        Ok(topic)
    }

    pub fn list_topics(&self) -> Vec<Topic> {
        self.topics.list()
    }

    /// Deletes a topic and cascades to every subscription it owns.
    pub fn delete_topic(&mut self, topic_id: &str) -> Result<(), BrokerError> {
        let topic = self.topics.delete(topic_id)?;
        let removed = self.subscriptions.remove_topic(topic_id);
        info!(
            topic = %topic.id,
            subscriptions = removed.len(),
            "topic deleted"
        );
        Ok(())
    }

    /// Binds an endpoint to a topic. The topic must exist; `queue`
    /// subscriptions get their backing queue created here.
    pub fn subscribe(
        &mut self,
        topic_id: &str,
        protocol: &str,
        endpoint: &str,
    ) -> Result<Subscription, BrokerError> {
        if !self.topics.contains(topic_id) {
            return Err(BrokerError::TopicNotFound(topic_id.to_string()));
        }
        let protocol = Protocol::parse(protocol)?;
        let subscription = self.subscriptions.add(topic_id, protocol, endpoint)?;
        if protocol == Protocol::Queue {
            self.queues.ensure(endpoint);
        }
        info!(
            subscription = %subscription.id,
            topic = topic_id,
            protocol = ?protocol,
            endpoint = endpoint,
            "subscription created"
        );
        Ok(subscription)
    }

    pub fn unsubscribe(&mut self, subscription_id: &str) -> Result<Subscription, BrokerError> {
        let removed = self.subscriptions.remove(subscription_id)?;
        info!(subscription = %removed.id, "subscription removed");
        Ok(removed)
    }

    pub fn subscriptions_for(&self, topic_id: &str) -> Vec<Subscription> {
        self.subscriptions.for_topic(topic_id)
    }

    pub fn list_subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.list()
    }

    /// Validates a publish and snapshots its delivery targets.
    ///
    /// `push` endpoints are resolved to their session's sender here, under
    /// the lock; a target whose session is gone keeps `sender: None` and is
    /// reported unreachable by the dispatcher.
    pub fn prepare_publish(
        &self,
        topic_id: &str,
        payload: String,
    ) -> Result<(Message, Vec<DeliveryTarget>), BrokerError> {
        if !self.topics.contains(topic_id) {
            return Err(BrokerError::TopicNotFound(topic_id.to_string()));
        }
        let message = Message::new(topic_id, payload);
        let targets = self
            .subscriptions
            .for_topic(topic_id)
            .into_iter()
            .map(|sub| {
                let sender = match sub.protocol {
                    Protocol::Push => self.clients.get(&sub.endpoint).map(|c| c.sender.clone()),
                    _ => None,
                };
                DeliveryTarget {
                    subscription: sub,
                    sender,
                }
            })
            .collect();
        Ok((message, targets))
    }
}
