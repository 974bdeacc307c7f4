pub mod batcher;
pub mod kafka;

pub use batcher::EventBatcher;
pub use kafka::KafkaBrokerClient;
