pub mod client;
pub mod pubsub_client;

pub use client::Client;
pub use pubsub_client::{ClientError, PubSubClient};

#[cfg(test)]
mod tests;
