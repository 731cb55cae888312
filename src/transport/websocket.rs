use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::{Broker, Dispatcher};
use crate::client::Client;
use crate::queues::QueueStore;
use crate::transport::message::{
    ClientRequest, DeliveredInfo, ServerMessage, SubscriptionInfo, TopicInfo,
};
use crate::utils::error::BrokerError;

/// Shared server state handed to each connection task.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub broker: Arc<Mutex<Broker>>,
    pub dispatcher: Arc<Dispatcher>,
    pub queues: Arc<QueueStore>,
}

/// Binds `addr` and serves the command protocol until the listener fails.
pub async fn start_websocket_server(addr: &str, state: ServerState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state).await
}

/// Accepts WebSocket connections on an already-bound listener.
///
/// Taking the listener lets callers bind port 0 and read the assigned
/// address back from it before serving starts.
pub async fn serve(listener: TcpListener, state: ServerState) -> std::io::Result<()> {
    let local = listener.local_addr()?;
    info!("listening on ws://{local}");

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(peer = %peer, "accepted connection");
        let state = state.clone();
        tokio::spawn(async move {
            handle_connection(stream, state).await;
        });
    }
}

async fn handle_connection(stream: tokio::net::TcpStream, state: ServerState) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(error = %e, "websocket handshake failed");
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Replies and push deliveries share one outbound channel so they are
    // written to the socket in a single task.
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    let client = Client::new(tx.clone());
    let client_id = client.id.clone();
    {
        let mut broker = state.broker.lock().unwrap();
        broker.register_client(client);
    }

    let welcome = ServerMessage::Welcome {
        client_id: client_id.clone(),
    };
    match serde_json::to_string(&welcome) {
        Ok(json) => {
            let _ = tx.send(WsMessage::text(json));
        }
        Err(e) => error!(error = %e, "failed to serialize welcome"),
    }

    let send_client_id = client_id.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sender.send(msg).await {
                warn!(client = %send_client_id, error = %e, "outbound send failed");
                break;
            }
        }
        debug!(client = %send_client_id, "send loop closed");
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        if !msg.is_text() {
            continue;
        }
        let text = match msg.to_text() {
            Ok(text) => text,
            Err(_) => continue,
        };
        let reply = match serde_json::from_str::<ClientRequest>(text) {
            Ok(request) => handle_request(&state, &client_id, request).await,
            Err(e) => ServerMessage::Error {
                kind: "InvalidArgument".to_string(),
                code: "MalformedRequest".to_string(),
                message: format!("could not parse request: {e}"),
            },
        };
        match serde_json::to_string(&reply) {
            Ok(json) => {
                if tx.send(WsMessage::text(json)).is_err() {
                    break;
                }
            }
            Err(e) => error!(error = %e, "failed to serialize reply"),
        }
    }

    debug!(client = %client_id, "connection closed");
    let mut broker = state.broker.lock().unwrap();
    broker.remove_client(&client_id);
}

fn error_frame(err: BrokerError) -> ServerMessage {
    ServerMessage::Error {
        kind: err.kind().as_str().to_string(),
        code: err.code().to_string(),
        message: err.to_string(),
    }
}

/// Maps one client command onto the broker and shapes the reply. Business
/// logic lives in the broker; this only translates.
pub async fn handle_request(
    state: &ServerState,
    client_id: &str,
    request: ClientRequest,
) -> ServerMessage {
    match request {
        ClientRequest::CreateTopic { name } => {
            let result = state.broker.lock().unwrap().create_topic(&name);
            match result {
                Ok(topic) => ServerMessage::TopicCreated { topic_id: topic.id },
                Err(e) => error_frame(e),
            }
        }
        ClientRequest::ListTopics => {
            let topics = state.broker.lock().unwrap().list_topics();
            ServerMessage::Topics {
                topics: topics
                    .into_iter()
                    .map(|t| TopicInfo {
                        topic_id: t.id,
                        name: t.name,
                    })
                    .collect(),
            }
        }
        ClientRequest::DeleteTopic { topic_id } => {
            let result = state.broker.lock().unwrap().delete_topic(&topic_id);
            match result {
                Ok(()) => ServerMessage::TopicDeleted { topic_id },
                Err(e) => error_frame(e),
            }
        }
        ClientRequest::Subscribe {
            topic_id,
            protocol,
            endpoint,
        } => {
            let result = state
                .broker
                .lock()
                .unwrap()
                .subscribe(&topic_id, &protocol, &endpoint);
            match result {
                Ok(sub) => ServerMessage::Subscribed {
                    subscription_id: sub.id,
                },
                Err(e) => error_frame(e),
            }
        }
        ClientRequest::Unsubscribe { subscription_id } => {
            let result = state.broker.lock().unwrap().unsubscribe(&subscription_id);
            match result {
                Ok(sub) => ServerMessage::Unsubscribed {
                    subscription_id: sub.id,
                },
                Err(e) => error_frame(e),
            }
        }
        ClientRequest::ListSubscriptions => {
            let subscriptions = state.broker.lock().unwrap().list_subscriptions();
            ServerMessage::Subscriptions {
                subscriptions: subscriptions
                    .into_iter()
                    .map(|s| SubscriptionInfo {
                        subscription_id: s.id,
                        topic_id: s.topic_id,
                        protocol: s.protocol,
                        endpoint: s.endpoint,
                    })
                    .collect(),
            }
        }
        ClientRequest::Publish { topic_id, payload } => {
            // Validate and snapshot under the lock, fan out without it.
            let prepared = state.broker.lock().unwrap().prepare_publish(&topic_id, payload);
            match prepared {
                Ok((message, targets)) => {
                    debug!(client = client_id, topic = %topic_id, "publish accepted");
                    let receipt = state.dispatcher.dispatch(&message, targets).await;
                    ServerMessage::Published {
                        message_id: receipt.message_id,
                        warnings: receipt.warnings.into_iter().map(Into::into).collect(),
                    }
                }
                Err(e) => error_frame(e),
            }
        }
        ClientRequest::Receive { queue, max } => match state.queues.receive(&queue, max) {
            Ok(messages) => ServerMessage::Messages {
                queue,
                messages: messages
                    .into_iter()
                    .map(|m| DeliveredInfo {
                        message_id: m.message_id,
                        topic_id: m.topic_id,
                        payload: m.payload,
                        timestamp: m.timestamp,
                    })
                    .collect(),
            },
            Err(e) => error_frame(e),
        },
    }
}
