use serial_test::serial;

use super::error::{BrokerError, ErrorKind};
use super::logging;

#[test]
#[serial]
fn test_logging_init_is_repeat_safe() {
    logging::init("debug");
    logging::init("warn");
    logging::init("not-a-level");
}

#[test]
#[serial]
fn test_logging_init_accepts_rust_log_directives() {
    temp_env::with_var("RUST_LOG", Some("fanout=trace,sled=warn"), || {
        logging::init("info");
    });
}

#[test]
fn test_error_kinds_and_codes() {
    let cases: Vec<(BrokerError, ErrorKind, &str)> = vec![
        (
            BrokerError::TopicNotFound("t".to_string()),
            ErrorKind::NotFound,
            "NonExistentTopic",
        ),
        (
            BrokerError::SubscriptionNotFound("s".to_string()),
            ErrorKind::NotFound,
            "NonExistentSubscription",
        ),
        (
            BrokerError::QueueNotFound("q".to_string()),
            ErrorKind::NotFound,
            "NonExistentQueue",
        ),
        (
            BrokerError::InvalidArgument("bad".to_string()),
            ErrorKind::InvalidArgument,
            "ValidationError",
        ),
        (
            BrokerError::Internal("boom".to_string()),
            ErrorKind::Internal,
            "InternalFailure",
        ),
    ];
    for (err, kind, code) in cases {
        assert_eq!(err.kind(), kind, "{err}");
        assert_eq!(err.code(), code, "{err}");
    }
}
