use std::time::{SystemTime, UNIX_EPOCH};
use serde::{Deserialize, Serialize};

/// Business actions recorded in the audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "Rates uploaded")]
    RatesUploaded,
    #[serde(rename = "Price calculated")]
    PriceCalculated,
    #[serde(rename = "Rate edited")]
    RateEdited,
    #[serde(rename = "Rate deleted")]
    RateDeleted,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::RatesUploaded => "Rates uploaded",
            ActionKind::PriceCalculated => "Price calculated",
            ActionKind::RateEdited => "Rate edited",
            ActionKind::RateDeleted => "Rate deleted",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit-log record: which action happened and when.
///
/// Immutable once created; the wire payload is the JSON form of this struct,
/// one Kafka message per event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: ActionKind,
    /// Seconds since the Unix epoch, sub-millisecond precision.
    pub timestamp: f64,
}

impl AuditEvent {
    pub fn record(action: ActionKind) -> Self {
        AuditEvent {
            action,
            timestamp: unix_now(),
        }
    }

    /// Partition key: the event timestamp at millisecond resolution,
    /// stringified. Spreads events across partitions while keeping the raw
    /// timestamp recoverable from the key.
    pub fn partition_key(&self) -> String {
        ((self.timestamp * 1000.0) as i64).to_string()
    }
}

/// Current wall clock as fractional seconds since the Unix epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_are_human_readable() {
        assert_eq!(ActionKind::RatesUploaded.as_str(), "Rates uploaded");
        assert_eq!(ActionKind::RateDeleted.to_string(), "Rate deleted");
    }

    #[test]
    fn wire_payload_is_self_describing_json() {
        let event = AuditEvent {
            action: ActionKind::PriceCalculated,
            timestamp: 1700000000.125,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "Price calculated");
        assert_eq!(json["timestamp"], 1700000000.125);

        let back: AuditEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn partition_key_is_millisecond_timestamp() {
        let event = AuditEvent {
            action: ActionKind::RateEdited,
            timestamp: 1700000000.125,
        };
        assert_eq!(event.partition_key(), "1700000000125");
    }

    #[test]
    fn record_uses_current_wall_clock() {
        let before = unix_now();
        let event = AuditEvent::record(ActionKind::RatesUploaded);
        let after = unix_now();
        assert!(event.timestamp >= before && event.timestamp <= after);
    }
}
