use crate::error::Result;
use async_trait::async_trait;

/// Connection to the message broker.
///
/// The batcher only needs four things from a broker: connect, fire off a
/// keyed message, wait for the broker to acknowledge everything outstanding,
/// and close. Keeping this a trait lets tests run against an in-memory
/// double instead of a live cluster.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Establish (or verify) the broker connection.
    async fn connect(&self) -> Result<()>;

    /// Hand one keyed message to the client for delivery. Returning `Ok`
    /// means the client accepted the message, not that the broker has it.
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<()>;

    /// Block until the broker has acknowledged every message accepted since
    /// the last confirmation.
    async fn confirm_delivery(&self) -> Result<()>;

    /// Release the connection.
    async fn close(&self);
}
