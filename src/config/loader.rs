use crate::config::{BatcherConfig, KafkaConfig};
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub batcher: BatcherConfig,
}

impl AppConfig {
    /// Load configuration from `config/default` layered with
    /// `RATELOG_`-prefixed environment variables
    /// (e.g. `RATELOG_KAFKA__BROKERS=localhost:9092`).
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("RATELOG").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<()> {
        if self.batcher.max_connect_retries == 0 {
            return Err(Error::ConfigError(
                "max_connect_retries must be at least 1".to_string(),
            ));
        }
        if self.batcher.batch_size == 0 {
            return Err(Error::ConfigError(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.batcher.flush_interval_secs <= 0.0
            || self.batcher.retry_delay_secs < 0.0
            || self.batcher.delivery_timeout_secs <= 0.0
        {
            return Err(Error::ConfigError(
                "intervals and timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
