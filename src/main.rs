use ratelog::config::AppConfig;
use ratelog::event_log::{EventBatcher, KafkaBrokerClient};
use ratelog::observability::{logging, metrics};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    metrics::register_metrics();

    let app_config = AppConfig::load()?;
    let client = Arc::new(KafkaBrokerClient::new(&app_config.kafka.brokers)?);
    let batcher = Arc::new(EventBatcher::new(
        client,
        app_config.kafka.topic.clone(),
        app_config.batcher.clone(),
    ));

    // The HTTP route layer holds this handle and calls `log_action` around
    // each domain mutation.
    batcher.start().await?;
    info!(topic = %app_config.kafka.topic, "Audit batcher running");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    batcher.stop().await;
    Ok(())
}
