use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Broker Errors
    #[error("Broker connection failed: {0}")]
    ConnectionError(String),

    #[error("Publish failed: {0}")]
    PublishError(String),

    #[error("Delivery confirmation failed: {0}")]
    DeliveryError(String),

    #[error("Delivery confirmation timed out after {0:?}")]
    DeliveryTimeout(Duration),

    // Event Errors
    #[error("Event serialization failed: {0}")]
    SerializationError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
