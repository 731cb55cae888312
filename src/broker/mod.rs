pub mod dispatcher;
pub mod engine;
pub mod message;
pub mod subscription;
pub mod topic;

pub use dispatcher::{Dispatcher, PublishReceipt};
pub use engine::Broker;
