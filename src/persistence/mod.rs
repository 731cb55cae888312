//! The `persistence` module is an optional sled-backed message log.
//!
//! When enabled in config, every accepted publish is appended to a per-topic
//! tree so operators can inspect or replay recent traffic. The broker never
//! reads it on the hot path; losing it cannot affect delivery.

pub mod sled_store;

pub use sled_store::MessageLog;
