//! The `error` module defines the broker-side error taxonomy.
//!
//! Application-level failures (`NotFound`, `InvalidArgument`) are returned as
//! structured results to the caller; `Internal` marks unexpected broker-side
//! faults so callers can tell "your request was invalid" from "the broker is
//! broken". Per-subscriber delivery failures are *not* errors — they live in
//! the publish receipt's warnings (see `broker::dispatcher`).

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`BrokerError`], mirrored into wire responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::Internal => "Internal",
        }
    }
}

/// An application-level broker error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("topic does not exist: {0}")]
    TopicNotFound(String),

    #[error("subscription does not exist: {0}")]
    SubscriptionNotFound(String),

    #[error("queue does not exist: {0}")]
    QueueNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal broker failure: {0}")]
    Internal(String),
}

impl BrokerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BrokerError::TopicNotFound(_)
            | BrokerError::SubscriptionNotFound(_)
            | BrokerError::QueueNotFound(_) => ErrorKind::NotFound,
            BrokerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BrokerError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code carried alongside the human message.
    pub fn code(&self) -> &'static str {
        match self {
            BrokerError::TopicNotFound(_) => "NonExistentTopic",
            BrokerError::SubscriptionNotFound(_) => "NonExistentSubscription",
            BrokerError::QueueNotFound(_) => "NonExistentQueue",
            BrokerError::InvalidArgument(_) => "ValidationError",
            BrokerError::Internal(_) => "InternalFailure",
        }
    }
}
