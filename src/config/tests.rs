use serial_test::serial;

use super::load_config;
use super::settings::Settings;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.server.log_level, "info");
    assert_eq!(settings.broker.delivery_timeout_ms, 2000);
    assert_eq!(settings.broker.max_queue_depth, 1000);
    assert_eq!(settings.broker.message_ttl_secs, 3600);
    assert!(!settings.persistence.enabled);
    assert_eq!(settings.persistence.path, "fanout_db");
}

#[test]
#[serial]
fn test_environment_overrides_host() {
    temp_env::with_var("FANOUT__SERVER__HOST", Some("0.0.0.0"), || {
        let settings = load_config().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
    });
}

#[test]
#[serial]
fn test_environment_overrides_fields_with_underscores() {
    // Double-underscore segment separation keeps snake_case field names
    // addressable from the environment.
    temp_env::with_vars(
        [
            ("FANOUT__BROKER__DELIVERY_TIMEOUT_MS", Some("2500")),
            ("FANOUT__BROKER__MAX_QUEUE_DEPTH", Some("42")),
            ("FANOUT__SERVER__LOG_LEVEL", Some("debug")),
            ("FANOUT__PERSISTENCE__ENABLED", Some("true")),
        ],
        || {
            let settings = load_config().unwrap();
            assert_eq!(settings.broker.delivery_timeout_ms, 2500);
            assert_eq!(settings.broker.max_queue_depth, 42);
            assert_eq!(settings.server.log_level, "debug");
            assert!(settings.persistence.enabled);
        },
    );
}

#[test]
#[serial]
fn test_unprefixed_variables_are_ignored() {
    temp_env::with_var("SERVER_HOST", Some("10.0.0.1"), || {
        let settings = load_config().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
    });
}

#[test]
#[serial]
fn test_missing_sources_fall_back_to_defaults() {
    temp_env::with_vars_unset(["FANOUT__SERVER__HOST", "FANOUT__SERVER__PORT"], || {
        let settings = load_config().unwrap();
        assert_eq!(settings.broker.delivery_timeout_ms, 2000);
        assert!(!settings.persistence.enabled);
    });
}
