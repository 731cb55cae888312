//! # fanout
//!
//! `fanout` is a minimal in-memory pub/sub notification broker served over
//! WebSockets. It implements the server side a local mock of a commercial
//! notification API needs: topic lifecycle, subscription linking, and
//! concurrent fan-out delivery with partial-failure isolation.
//!
//! ## Core modules
//!
//! - `broker`: topic registry, subscription index, and the delivery
//!   dispatcher.
//! - `queues`: named in-memory delivery queues backing `queue` subscriptions.
//! - `transport`: the WebSocket request façade and its JSON command protocol.
//! - `client`: connected-session handle plus an embedded calling-side client.
//! - `config`: layered configuration with built-in defaults.
//! - `persistence`: optional sled-backed message log.
//! - `utils`: error taxonomy and logging bootstrap.

pub mod broker;
pub mod client;
pub mod config;
pub mod persistence;
pub mod queues;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
