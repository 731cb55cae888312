use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, warn};

use fanout::broker::{Broker, Dispatcher};
use fanout::config::load_config;
use fanout::persistence::MessageLog;
use fanout::queues::QueueStore;
use fanout::transport::{ServerState, start_websocket_server};
use fanout::utils::logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = load_config().expect("Failed to load configuration");
    logging::init(&config.server.log_level);

    let log = if config.persistence.enabled {
        match MessageLog::open(
            &config.persistence.path,
            Some(config.broker.message_ttl_secs as i64),
        ) {
            Ok(log) => Some(log),
            Err(e) => {
                warn!(error = %e, "message log unavailable, continuing without it");
                None
            }
        }
    } else {
        None
    };

    let queues = Arc::new(QueueStore::new(config.broker.max_queue_depth));
    let broker = Arc::new(Mutex::new(Broker::new(queues.clone())));
    let dispatcher = Arc::new(Dispatcher::new(
        queues.clone(),
        Duration::from_millis(config.broker.delivery_timeout_ms),
        log,
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = ServerState {
        broker,
        dispatcher,
        queues,
    };
    if let Err(e) = start_websocket_server(&addr, state).await {
        error!(error = %e, "server terminated");
        std::process::exit(1);
    }
}
