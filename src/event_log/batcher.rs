use crate::config::BatcherConfig;
use crate::error::{Error, Result};
use crate::events::{ActionKind, AuditEvent, action::unix_now};
use crate::interfaces::BrokerClient;
use crate::observability::metrics;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How often the flush loop re-evaluates `should_flush`.
const FLUSH_TICK: Duration = Duration::from_millis(100);

/// Batching shipper for audit events.
///
/// Producers call [`log_action`](EventBatcher::log_action) fire-and-forget;
/// a background task drains the buffer to the broker whenever it reaches
/// `batch_size` events or `flush_interval_secs` has elapsed since the last
/// flush. A failed send puts the whole snapshot back at the front of the
/// buffer, so no event is dropped while the process is alive. Two limitations
/// are deliberate: the buffer grows without bound while the broker is
/// unreachable, and the final flush in [`stop`](EventBatcher::stop) is not
/// retried, so events buffered at shutdown can be lost if the broker is down.
pub struct EventBatcher {
    client: Arc<dyn BrokerClient>,
    topic: String,
    config: BatcherConfig,
    buffer: Mutex<Vec<AuditEvent>>,
    last_flush: Mutex<f64>,
    running: AtomicBool,
    flush_task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl EventBatcher {
    pub fn new(
        client: Arc<dyn BrokerClient>,
        topic: impl Into<String>,
        config: BatcherConfig,
    ) -> Self {
        EventBatcher {
            client,
            topic: topic.into(),
            config,
            buffer: Mutex::new(Vec::new()),
            last_flush: Mutex::new(unix_now()),
            running: AtomicBool::new(false),
            flush_task: tokio::sync::Mutex::new(None),
        }
    }

    /// Record one audit event. Synchronous, never blocks on the broker and
    /// never fails; broker health is invisible to producers.
    pub fn log_action(&self, action: ActionKind) {
        let mut buffer = self.buffer.lock().unwrap();
        buffer.push(AuditEvent::record(action));
        metrics::EVENTS_BUFFERED.inc();
        metrics::BUFFER_DEPTH.set(buffer.len() as i64);
    }

    /// Number of events currently waiting in the buffer.
    pub fn pending(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    /// Connect to the broker and spawn the flush loop. No-op if already
    /// running. Connection failure after `max_connect_retries` attempts is
    /// fatal and propagated to the caller.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Err(e) = self.connect_with_retries().await {
            self.running.store(false, Ordering::SeqCst);
            return Err(e);
        }

        *self.last_flush.lock().unwrap() = unix_now();
        let batcher = Arc::clone(self);
        let handle = tokio::spawn(async move { batcher.run_flush_loop().await });
        *self.flush_task.lock().await = Some(handle);
        Ok(())
    }

    /// Stop the flush loop, drain the buffer once (best effort, not
    /// retried), and close the broker connection. Does not interrupt an
    /// in-flight send; the loop finishes its current attempt first.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.flush_task.lock().await.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "Flush loop task failed");
            }
        }

        if let Err(e) = self.flush_buffer().await {
            error!(error = %e, "Final flush on shutdown failed");
        }
        self.client.close().await;
        info!("Audit batcher stopped");
    }

    async fn connect_with_retries(&self) -> Result<()> {
        let max_attempts = self.config.max_connect_retries;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.connect().await {
                Ok(()) => {
                    info!("Connected to broker");
                    return Ok(());
                }
                Err(e) if attempt >= max_attempts => {
                    error!(attempt, error = %e, "Giving up connecting to broker");
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "Failed to connect to broker, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
            }
        }
    }

    async fn run_flush_loop(&self) {
        while self.running.load(Ordering::SeqCst) {
            if self.should_flush() {
                if let Err(e) = self.flush_buffer().await {
                    error!(error = %e, "Error in flush loop");
                    tokio::time::sleep(self.config.retry_delay()).await;
                    continue;
                }
            }
            tokio::time::sleep(FLUSH_TICK).await;
        }
    }

    /// True when the buffer has reached `batch_size` or `flush_interval_secs`
    /// has elapsed since the last flush. Boundary values count.
    fn should_flush(&self) -> bool {
        let len = self.buffer.lock().unwrap().len();
        len >= self.config.batch_size
            || unix_now() - *self.last_flush.lock().unwrap() >= self.config.flush_interval_secs
    }

    /// Snapshot and clear the buffer, then ship the snapshot. The lock is
    /// released before any network I/O. On failure the snapshot goes back in
    /// front of whatever was appended during the attempt, preserving relative
    /// order. An empty buffer is a no-op that leaves `last_flush` untouched.
    async fn flush_buffer(&self) -> Result<()> {
        let batch = {
            let mut buffer = self.buffer.lock().unwrap();
            if buffer.is_empty() {
                return Ok(());
            }
            *self.last_flush.lock().unwrap() = unix_now();
            metrics::BUFFER_DEPTH.set(0);
            std::mem::take(&mut *buffer)
        };

        let count = batch.len();
        match self.send_batch(&batch).await {
            Ok(()) => {
                info!(count, "Published audit batch");
                metrics::BATCHES_SENT.inc();
            }
            Err(e) => {
                warn!(count, error = %e, "Failed to send audit batch, re-buffering");
                metrics::BATCH_SEND_FAILURES.inc();
                let mut buffer = self.buffer.lock().unwrap();
                let newer = std::mem::replace(&mut *buffer, batch);
                buffer.extend(newer);
                metrics::BUFFER_DEPTH.set(buffer.len() as i64);
            }
        }
        Ok(())
    }

    /// Publish every event of the snapshot as its own keyed message,
    /// concurrently, then wait for broker confirmation under a bounded
    /// timeout. All-or-nothing from the batcher's point of view: any publish
    /// error, confirmation error, or timeout fails the whole batch. The
    /// broker itself may still have accepted part of it.
    async fn send_batch(&self, events: &[AuditEvent]) -> Result<()> {
        let mut messages = Vec::with_capacity(events.len());
        for event in events {
            let payload = serde_json::to_vec(event)
                .map_err(|e| Error::SerializationError(e.to_string()))?;
            messages.push((event.partition_key(), payload));
        }

        // join_all awaits every publish even if one of them fails early.
        let publishes = messages
            .iter()
            .map(|(key, payload)| self.client.publish(&self.topic, key, payload));
        for result in join_all(publishes).await {
            result?;
        }

        tokio::time::timeout(self.config.delivery_timeout(), self.client.confirm_delivery())
            .await
            .map_err(|_| Error::DeliveryTimeout(self.config.delivery_timeout()))??;
        Ok(())
    }

    #[cfg(test)]
    fn buffered_actions(&self) -> Vec<ActionKind> {
        self.buffer.lock().unwrap().iter().map(|e| e.action).collect()
    }

    #[cfg(test)]
    fn last_flush_time(&self) -> f64 {
        *self.last_flush.lock().unwrap()
    }

    #[cfg(test)]
    fn set_last_flush(&self, time: f64) {
        *self.last_flush.lock().unwrap() = time;
    }
}
