use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;

use crate::broker::{Broker, Dispatcher};
use crate::client::{ClientError, PubSubClient};
use crate::queues::QueueStore;
use crate::transport::{ServerState, serve};

/// Binds port 0 so parallel tests never collide; the listener is bound
/// before the serve task spawns, so connecting cannot race it.
async fn start_test_server() -> String {
    let queues = Arc::new(QueueStore::new(100));
    let state = ServerState {
        broker: Arc::new(Mutex::new(Broker::new(queues.clone()))),
        dispatcher: Arc::new(Dispatcher::new(
            queues.clone(),
            Duration::from_millis(500),
            None,
        )),
        queues,
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = serve(listener, state).await;
    });
    format!("ws://{addr}")
}

#[tokio::test]
async fn integration_topic_lifecycle_with_queue_delivery() {
    let url = start_test_server().await;
    let mut client = PubSubClient::connect(&url).await.expect("connect");

    let topic_id = client.create_topic("MyTopic").await.unwrap();
    assert!(client
        .list_topics()
        .await
        .unwrap()
        .iter()
        .any(|t| t.topic_id == topic_id));

    let subscription_id = client
        .subscribe(&topic_id, "queue", "local-queue1")
        .await
        .unwrap();
    assert!(!subscription_id.is_empty());

    let (message_id, warnings) = client
        .publish(&topic_id, "Sent to MyTopic!!!")
        .await
        .unwrap();
    assert!(!message_id.is_empty());
    assert!(warnings.is_empty());

    let delivered = client.receive("local-queue1", 10).await.unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].payload, "Sent to MyTopic!!!");
    assert_eq!(delivered[0].message_id, message_id);

    client.delete_topic(&topic_id).await.unwrap();
    assert!(client.list_topics().await.unwrap().is_empty());

    // Re-subscribing to the deleted id must fail as an application error.
    let err = client
        .subscribe(&topic_id, "queue", "local-queue1")
        .await
        .unwrap_err();
    match err {
        ClientError::Api { kind, code, .. } => {
            assert_eq!(kind, "NotFound");
            assert_eq!(code, "NonExistentTopic");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn integration_push_delivery_between_connections() {
    let url = start_test_server().await;
    let mut publisher = PubSubClient::connect(&url).await.expect("connect publisher");
    let mut subscriber = PubSubClient::connect(&url).await.expect("connect subscriber");

    let topic_id = publisher.create_topic("chat").await.unwrap();
    let endpoint = subscriber.session_id().to_string();
    subscriber
        .subscribe(&topic_id, "push", &endpoint)
        .await
        .unwrap();

    let (message_id, warnings) = publisher.publish(&topic_id, "hello subscriber").await.unwrap();
    assert!(warnings.is_empty());

    let delivery = tokio::time::timeout(Duration::from_secs(2), subscriber.next_delivery())
        .await
        .expect("delivery timed out")
        .unwrap();
    assert_eq!(delivery.payload, "hello subscriber");
    assert_eq!(delivery.message_id, message_id);
    assert_eq!(delivery.topic_id, topic_id);
}

#[tokio::test]
async fn integration_create_topic_is_idempotent_across_connections() {
    let url = start_test_server().await;
    let mut a = PubSubClient::connect(&url).await.unwrap();
    let mut b = PubSubClient::connect(&url).await.unwrap();

    let first = a.create_topic("shared").await.unwrap();
    let second = b.create_topic("shared").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(a.list_topics().await.unwrap().len(), 1);
}

#[tokio::test]
async fn integration_list_subscriptions_tracks_cascade() {
    let url = start_test_server().await;
    let mut client = PubSubClient::connect(&url).await.unwrap();

    let keep = client.create_topic("keep").await.unwrap();
    let doomed = client.create_topic("drop").await.unwrap();
    client.subscribe(&keep, "queue", "q-keep").await.unwrap();
    client.subscribe(&doomed, "queue", "q-drop").await.unwrap();

    client.delete_topic(&doomed).await.unwrap();
    let subs = client.list_subscriptions().await.unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].topic_id, keep);
}
