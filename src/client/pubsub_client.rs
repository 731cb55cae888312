use std::collections::VecDeque;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tungstenite::protocol::Message as WsMessage;

use crate::transport::message::{
    ClientRequest, DeliveredInfo, ServerMessage, SubscriptionInfo, TopicInfo, WarningInfo,
};

/// Calling-side failure taxonomy.
///
/// `Transport` covers everything that keeps a request from reaching the
/// broker or its reply from coming back; `Api` is the broker's own
/// structured rejection. The two never mix: a caller can always tell "I
/// couldn't reach the broker" from "the broker refused my request".
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("connection closed by broker")]
    ConnectionClosed,

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("broker rejected request ({kind}/{code}): {message}")]
    Api {
        kind: String,
        code: String,
        message: String,
    },
}

/// A connected broker client speaking the tagged-JSON command protocol.
///
/// Requests get exactly one reply frame; unsolicited `message` frames
/// (push deliveries) arriving in between are buffered and handed out by
/// [`PubSubClient::next_delivery`].
#[derive(Debug)]
pub struct PubSubClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    session_id: String,
    deliveries: VecDeque<DeliveredInfo>,
}

impl PubSubClient {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (stream, _response) = connect_async(url).await?;
        let mut client = Self {
            stream,
            session_id: String::new(),
            deliveries: VecDeque::new(),
        };
        match client.next_frame().await? {
            ServerMessage::Welcome { client_id } => client.session_id = client_id,
            other => return Err(unexpected(other)),
        }
        Ok(client)
    }

    /// This connection's session id; use it as the endpoint of a `push`
    /// subscription to receive deliveries on this connection.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn create_topic(&mut self, name: &str) -> Result<String, ClientError> {
        match self
            .call(ClientRequest::CreateTopic {
                name: name.to_string(),
            })
            .await?
        {
            ServerMessage::TopicCreated { topic_id } => Ok(topic_id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn list_topics(&mut self) -> Result<Vec<TopicInfo>, ClientError> {
        match self.call(ClientRequest::ListTopics).await? {
            ServerMessage::Topics { topics } => Ok(topics),
            other => Err(unexpected(other)),
        }
    }

    pub async fn delete_topic(&mut self, topic_id: &str) -> Result<(), ClientError> {
        match self
            .call(ClientRequest::DeleteTopic {
                topic_id: topic_id.to_string(),
            })
            .await?
        {
            ServerMessage::TopicDeleted { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn subscribe(
        &mut self,
        topic_id: &str,
        protocol: &str,
        endpoint: &str,
    ) -> Result<String, ClientError> {
        match self
            .call(ClientRequest::Subscribe {
                topic_id: topic_id.to_string(),
                protocol: protocol.to_string(),
                endpoint: endpoint.to_string(),
            })
            .await?
        {
            ServerMessage::Subscribed { subscription_id } => Ok(subscription_id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn unsubscribe(&mut self, subscription_id: &str) -> Result<(), ClientError> {
        match self
            .call(ClientRequest::Unsubscribe {
                subscription_id: subscription_id.to_string(),
            })
            .await?
        {
            ServerMessage::Unsubscribed { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn list_subscriptions(&mut self) -> Result<Vec<SubscriptionInfo>, ClientError> {
        match self.call(ClientRequest::ListSubscriptions).await? {
            ServerMessage::Subscriptions { subscriptions } => Ok(subscriptions),
            other => Err(unexpected(other)),
        }
    }

    /// Publishes and returns the message id plus any per-subscriber
    /// delivery warnings.
    pub async fn publish(
        &mut self,
        topic_id: &str,
        payload: &str,
    ) -> Result<(String, Vec<WarningInfo>), ClientError> {
        match self
            .call(ClientRequest::Publish {
                topic_id: topic_id.to_string(),
                payload: payload.to_string(),
            })
            .await?
        {
            ServerMessage::Published {
                message_id,
                warnings,
            } => Ok((message_id, warnings)),
            other => Err(unexpected(other)),
        }
    }

    /// Drains up to `max` messages from a delivery queue.
    pub async fn receive(
        &mut self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<DeliveredInfo>, ClientError> {
        match self
            .call(ClientRequest::Receive {
                queue: queue.to_string(),
                max,
            })
            .await?
        {
            ServerMessage::Messages { messages, .. } => Ok(messages),
            other => Err(unexpected(other)),
        }
    }

    /// Waits for the next push delivery on this connection.
    pub async fn next_delivery(&mut self) -> Result<DeliveredInfo, ClientError> {
        if let Some(delivery) = self.deliveries.pop_front() {
            return Ok(delivery);
        }
        match self.next_frame().await? {
            ServerMessage::Message {
                message_id,
                topic_id,
                payload,
                timestamp,
            } => Ok(DeliveredInfo {
                message_id,
                topic_id,
                payload,
                timestamp,
            }),
            other => Err(unexpected(other)),
        }
    }

    /// Sends one request and returns its reply, buffering any push
    /// deliveries that arrive in between.
    async fn call(&mut self, request: ClientRequest) -> Result<ServerMessage, ClientError> {
        let json = serde_json::to_string(&request)
            .map_err(|e| ClientError::Protocol(format!("failed to encode request: {e}")))?;
        self.stream.send(WsMessage::text(json)).await?;
        loop {
            match self.next_frame().await? {
                ServerMessage::Message {
                    message_id,
                    topic_id,
                    payload,
                    timestamp,
                } => {
                    self.deliveries.push_back(DeliveredInfo {
                        message_id,
                        topic_id,
                        payload,
                        timestamp,
                    });
                }
                ServerMessage::Error {
                    kind,
                    code,
                    message,
                } => {
                    return Err(ClientError::Api {
                        kind,
                        code,
                        message,
                    });
                }
                reply => return Ok(reply),
            }
        }
    }

    async fn next_frame(&mut self) -> Result<ServerMessage, ClientError> {
        loop {
            let frame = self
                .stream
                .next()
                .await
                .ok_or(ClientError::ConnectionClosed)??;
            if let WsMessage::Text(text) = frame {
                return serde_json::from_str(&text)
                    .map_err(|e| ClientError::Protocol(format!("unparseable frame: {e}")));
            }
        }
    }
}

fn unexpected(frame: ServerMessage) -> ClientError {
    ClientError::Protocol(format!("unexpected reply frame: {frame:?}"))
}
