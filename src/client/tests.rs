use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

use super::Client;
use super::pubsub_client::ClientError;

#[test]
fn test_client_new_assigns_unique_ids() {
    let (tx, _rx) = mpsc::unbounded_channel::<WsMessage>();
    let a = Client::new(tx.clone());
    let b = Client::new(tx);
    assert!(a.id.starts_with("client-"));
    assert_ne!(a.id, b.id);
}

#[test]
fn test_client_sender_delivers() {
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let client = Client::new(tx);
    client.sender.send(WsMessage::text("ping")).unwrap();
    let got = rx.try_recv().unwrap();
    assert_eq!(got.to_text().unwrap(), "ping");
}

#[test]
fn test_api_error_keeps_kind_and_code() {
    let err = ClientError::Api {
        kind: "NotFound".to_string(),
        code: "NonExistentTopic".to_string(),
        message: "topic does not exist: local:topic:ghost".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("NotFound"));
    assert!(text.contains("NonExistentTopic"));
}

#[tokio::test]
async fn test_connect_failure_is_transport_error() {
    // Nothing listens on this port; the failure must surface as Transport,
    // not as a broker Api error.
    let err = super::PubSubClient::connect("ws://127.0.0.1:59999")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
