use crate::error::{Error, Result};
use crate::interfaces::BrokerClient;
use async_trait::async_trait;
use futures::future::join_all;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord, Producer};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka-backed [`BrokerClient`].
///
/// `publish` only enqueues a record with librdkafka; the matching delivery
/// future is retained so `confirm_delivery` can wait until the broker has
/// acknowledged every outstanding record.
pub struct KafkaBrokerClient {
    producer: FutureProducer,
    brokers: String,
    pending: Mutex<Vec<DeliveryFuture>>,
}

impl KafkaBrokerClient {
    pub fn new(brokers: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("compression.type", "lz4")
            .create()
            .map_err(|e| Error::ConnectionError(e.to_string()))?;

        Ok(KafkaBrokerClient {
            producer,
            brokers: brokers.to_string(),
            pending: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl BrokerClient for KafkaBrokerClient {
    async fn connect(&self) -> Result<()> {
        // librdkafka connects lazily; a metadata fetch proves the cluster is
        // reachable before the flush loop starts ticking.
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || {
            producer
                .client()
                .fetch_metadata(None, METADATA_TIMEOUT)
                .map(|_| ())
                .map_err(|e| Error::ConnectionError(e.to_string()))
        })
        .await
        .map_err(|e| Error::ConnectionError(e.to_string()))??;

        info!(brokers = %self.brokers, "Kafka cluster reachable");
        Ok(())
    }

    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<()> {
        let record = FutureRecord::to(topic).key(key).payload(payload);
        let delivery = self
            .producer
            .send_result(record)
            .map_err(|(e, _)| Error::PublishError(e.to_string()))?;
        self.pending.lock().unwrap().push(delivery);
        Ok(())
    }

    async fn confirm_delivery(&self) -> Result<()> {
        let pending: Vec<DeliveryFuture> = std::mem::take(&mut *self.pending.lock().unwrap());

        let mut first_error = None;
        for result in join_all(pending).await {
            match result {
                Ok(Ok(_)) => {}
                Ok(Err((e, _))) => {
                    first_error.get_or_insert(Error::DeliveryError(e.to_string()));
                }
                Err(_) => {
                    first_error.get_or_insert(Error::DeliveryError(
                        "delivery notification canceled".to_string(),
                    ));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn close(&self) {
        // Give librdkafka a bounded chance to drain its internal queue.
        let producer = self.producer.clone();
        let _ = tokio::task::spawn_blocking(move || producer.flush(METADATA_TIMEOUT)).await;
    }
}
