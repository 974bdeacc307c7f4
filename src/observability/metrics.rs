use lazy_static::lazy_static;
use prometheus::{Counter, IntGauge, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Audit batcher metrics
    pub static ref EVENTS_BUFFERED: Counter = Counter::new(
        "audit_events_buffered_total",
        "Total number of audit events accepted into the buffer"
    ).unwrap();

    pub static ref BATCHES_SENT: Counter = Counter::new(
        "audit_batches_sent_total",
        "Total number of audit batches confirmed by the broker"
    ).unwrap();

    pub static ref BATCH_SEND_FAILURES: Counter = Counter::new(
        "audit_batch_send_failures_total",
        "Total number of batch send attempts that failed and were re-buffered"
    ).unwrap();

    pub static ref BUFFER_DEPTH: IntGauge = IntGauge::new(
        "audit_buffer_depth",
        "Current number of audit events waiting in the buffer"
    ).unwrap();
}

pub fn register_metrics() {
    REGISTRY.register(Box::new(EVENTS_BUFFERED.clone())).unwrap();
    REGISTRY.register(Box::new(BATCHES_SENT.clone())).unwrap();
    REGISTRY.register(Box::new(BATCH_SEND_FAILURES.clone())).unwrap();
    REGISTRY.register(Box::new(BUFFER_DEPTH.clone())).unwrap();
}
