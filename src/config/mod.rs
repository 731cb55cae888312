mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, PersistenceSettings, ServerSettings, Settings};

/// Loads configuration from `config/default` (if present) and environment
/// variables, merging whatever is set onto the built-in defaults.
///
/// Environment overrides use the `FANOUT__` prefix with `__` between path
/// segments, so field names containing underscores stay addressable:
/// `FANOUT__SERVER__HOST`, `FANOUT__BROKER__DELIVERY_TIMEOUT_MS`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("FANOUT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Deserialize what is available, then fill the gaps from defaults.
    let partial: PartialSettings = config.try_deserialize()?;

    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
            log_level: partial
                .server
                .as_ref()
                .and_then(|s| s.log_level.clone())
                .unwrap_or(default.server.log_level),
        },
        broker: BrokerSettings {
            delivery_timeout_ms: partial
                .broker
                .as_ref()
                .and_then(|b| b.delivery_timeout_ms)
                .unwrap_or(default.broker.delivery_timeout_ms),
            max_queue_depth: partial
                .broker
                .as_ref()
                .and_then(|b| b.max_queue_depth)
                .unwrap_or(default.broker.max_queue_depth),
            message_ttl_secs: partial
                .broker
                .as_ref()
                .and_then(|b| b.message_ttl_secs)
                .unwrap_or(default.broker.message_ttl_secs),
        },
        persistence: PersistenceSettings {
            enabled: partial
                .persistence
                .as_ref()
                .and_then(|p| p.enabled)
                .unwrap_or(default.persistence.enabled),
            path: partial
                .persistence
                .as_ref()
                .and_then(|p| p.path.clone())
                .unwrap_or(default.persistence.path),
        },
    })
}

#[cfg(test)]
mod tests;
