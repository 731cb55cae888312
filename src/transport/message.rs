use serde::{Deserialize, Serialize};

use crate::broker::dispatcher::DeliveryWarning;
use crate::broker::subscription::Protocol;

fn default_receive_max() -> usize {
    10
}

/// A command frame from a client. Tagged JSON, one command per text frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    CreateTopic {
        name: String,
    },
    ListTopics,
    DeleteTopic {
        topic_id: String,
    },
    Subscribe {
        topic_id: String,
        protocol: String,
        endpoint: String,
    },
    Unsubscribe {
        subscription_id: String,
    },
    ListSubscriptions,
    Publish {
        topic_id: String,
        payload: String,
    },
    Receive {
        queue: String,
        #[serde(default = "default_receive_max")]
        max: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicInfo {
    pub topic_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub subscription_id: String,
    pub topic_id: String,
    pub protocol: Protocol,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveredInfo {
    pub message_id: String,
    pub topic_id: String,
    pub payload: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningInfo {
    pub subscription_id: String,
    pub endpoint: String,
    pub reason: String,
}

impl From<DeliveryWarning> for WarningInfo {
    fn from(w: DeliveryWarning) -> Self {
        Self {
            subscription_id: w.subscription_id,
            endpoint: w.endpoint,
            reason: w.reason,
        }
    }
}

/// A frame from the broker to a client.
///
/// Every [`ClientRequest`] gets exactly one reply frame (a success variant or
/// `Error`). `Message` frames are unsolicited: they carry fan-out deliveries
/// to `push` subscribers and can interleave with replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when a connection is established; carries the session's
    /// client id, which `push` subscriptions use as their endpoint.
    Welcome {
        client_id: String,
    },
    TopicCreated {
        topic_id: String,
    },
    Topics {
        topics: Vec<TopicInfo>,
    },
    TopicDeleted {
        topic_id: String,
    },
    Subscribed {
        subscription_id: String,
    },
    Unsubscribed {
        subscription_id: String,
    },
    Subscriptions {
        subscriptions: Vec<SubscriptionInfo>,
    },
    Published {
        message_id: String,
        warnings: Vec<WarningInfo>,
    },
    Messages {
        queue: String,
        messages: Vec<DeliveredInfo>,
    },
    Message {
        message_id: String,
        topic_id: String,
        payload: String,
        timestamp: i64,
    },
    Error {
        kind: String,
        code: String,
        message: String,
    },
}
