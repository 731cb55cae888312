//! The `transport` module is the request façade: a WebSocket server with a
//! tagged-JSON command protocol. It shapes inputs and outputs and normalizes
//! errors; business logic stays in `broker`.

pub mod message;
pub mod websocket;

pub use websocket::{ServerState, serve, start_websocket_server};
