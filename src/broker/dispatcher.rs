use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use tracing::{debug, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::message::Message;
use crate::broker::subscription::{Protocol, Subscription};
use crate::persistence::MessageLog;
use crate::queues::{DeliveredMessage, QueueStore};

/// One resolved delivery destination, snapshotted by the engine under its
/// lock. For `push` targets the session sender is captured at snapshot time;
/// `None` means the session was already gone.
#[derive(Debug)]
pub struct DeliveryTarget {
    pub subscription: Subscription,
    pub sender: Option<UnboundedSender<WsMessage>>,
}

/// A per-subscriber delivery failure. Non-fatal: warnings ride along in the
/// publish receipt and are logged, they never fail the publish.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryWarning {
    pub subscription_id: String,
    pub endpoint: String,
    pub reason: String,
}

/// What the caller gets back from an accepted publish.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    pub message_id: String,
    pub warnings: Vec<DeliveryWarning>,
}

/// Fans a published message out to its delivery targets.
///
/// Deliveries run concurrently and each is bounded by the configured
/// timeout; one slow or dead endpoint costs at most that timeout and never
/// blocks the others. At-least-once per reachable subscriber, no ordering
/// guarantee across subscribers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    queues: Arc<QueueStore>,
    http: reqwest::Client,
    delivery_timeout: Duration,
    log: Option<MessageLog>,
}

impl Dispatcher {
    pub fn new(
        queues: Arc<QueueStore>,
        delivery_timeout: Duration,
        log: Option<MessageLog>,
    ) -> Self {
        Self {
            queues,
            http: reqwest::Client::new(),
            delivery_timeout,
            log,
        }
    }

    /// Delivers `message` to every target, collecting the failures.
    pub async fn dispatch(
        &self,
        message: &Message,
        targets: Vec<DeliveryTarget>,
    ) -> PublishReceipt {
        if let Some(log) = &self.log {
            log.append(message);
        }
        debug!(
            message = %message.message_id,
            topic = %message.topic_id,
            subscribers = targets.len(),
            "dispatching"
        );
        let attempts = targets.into_iter().map(|target| async move {
            let result = timeout(self.delivery_timeout, self.deliver(message, &target)).await;
            let failure = match result {
                Ok(Ok(())) => return None,
                Ok(Err(reason)) => reason,
                Err(_) => format!(
                    "delivery timed out after {}ms",
                    self.delivery_timeout.as_millis()
                ),
            };
            warn!(
                subscription = %target.subscription.id,
                endpoint = %target.subscription.endpoint,
                reason = %failure,
                "delivery failed"
            );
            Some(DeliveryWarning {
                subscription_id: target.subscription.id.clone(),
                endpoint: target.subscription.endpoint.clone(),
                reason: failure,
            })
        });
        let warnings = join_all(attempts).await.into_iter().flatten().collect();
        PublishReceipt {
            message_id: message.message_id.clone(),
            warnings,
        }
    }

    async fn deliver(&self, message: &Message, target: &DeliveryTarget) -> Result<(), String> {
        match target.subscription.protocol {
            Protocol::Queue => {
                self.queues
                    .push(&target.subscription.endpoint, DeliveredMessage::from(message));
                Ok(())
            }
            Protocol::Push => {
                let sender = target
                    .sender
                    .as_ref()
                    .ok_or_else(|| "subscriber session is not connected".to_string())?;
                let frame = serde_json::json!({
                    "type": "message",
                    "message_id": message.message_id,
                    "topic_id": message.topic_id,
                    "payload": message.payload,
                    "timestamp": message.timestamp,
                })
                .to_string();
                sender
                    .send(WsMessage::text(frame))
                    .map_err(|e| format!("subscriber channel closed: {e}"))
            }
            Protocol::Http => {
                let response = self
                    .http
                    .post(&target.subscription.endpoint)
                    .json(&DeliveredMessage::from(message))
                    .send()
                    .await
                    .map_err(|e| format!("request failed: {e}"))?;
                response
                    .error_for_status()
                    .map(|_| ())
                    .map_err(|e| format!("endpoint rejected delivery: {e}"))
            }
        }
    }
}
