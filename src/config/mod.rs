use std::time::Duration;
use serde::Deserialize;

pub mod loader;

pub use loader::AppConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct KafkaConfig {
    pub brokers: String,
    #[serde(default = "default_topic")]
    pub topic: String,
}

/// Flush and retry thresholds for the audit-event batcher, captured once at
/// construction.
#[derive(Clone, Debug, Deserialize)]
pub struct BatcherConfig {
    /// Flush when the buffer holds at least this many events.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Flush when this much wall time has elapsed since the last flush,
    /// regardless of buffer size.
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: f64,
    /// Connection attempts before `start()` gives up.
    #[serde(default = "default_max_connect_retries")]
    pub max_connect_retries: u32,
    /// Pause between connection attempts and after a flush-loop error.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: f64,
    /// Upper bound on waiting for broker delivery confirmation.
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_secs: f64,
}

fn default_topic() -> String {
    "log_topic".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_flush_interval() -> f64 {
    5.0
}

fn default_max_connect_retries() -> u32 {
    3
}

fn default_retry_delay() -> f64 {
    5.0
}

fn default_delivery_timeout() -> f64 {
    30.0
}

impl Default for BatcherConfig {
    fn default() -> Self {
        BatcherConfig {
            batch_size: default_batch_size(),
            flush_interval_secs: default_flush_interval(),
            max_connect_retries: default_max_connect_retries(),
            retry_delay_secs: default_retry_delay(),
            delivery_timeout_secs: default_delivery_timeout(),
        }
    }
}

impl BatcherConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.delivery_timeout_secs)
    }
}
