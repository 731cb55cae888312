use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub persistence: PersistenceSettings,
}

/// Host and port the WebSocket server binds to, plus the log level.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

/// Operational parameters of the broker core.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    /// Upper bound on one subscriber's delivery attempt during fan-out.
    pub delivery_timeout_ms: u64,
    /// Maximum messages held per delivery queue; oldest dropped beyond this.
    pub max_queue_depth: usize,
    /// TTL for entries in the optional message log.
    pub message_ttl_secs: u64,
}

/// The optional sled-backed message log.
#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceSettings {
    pub enabled: bool,
    pub path: String,
}

/// Partial configuration loaded from files or environment.
///
/// Every field is optional; missing values fall back to defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub persistence: Option<PartialPersistenceSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub delivery_timeout_ms: Option<u64>,
    pub max_queue_depth: Option<usize>,
    pub message_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialPersistenceSettings {
    pub enabled: Option<bool>,
    pub path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
                log_level: "info".to_string(),
            },
            broker: BrokerSettings {
                delivery_timeout_ms: 2000,
                max_queue_depth: 1000,
                message_ttl_secs: 3600,
            },
            persistence: PersistenceSettings {
                enabled: false,
                path: "fanout_db".to_string(),
            },
        }
    }
}
