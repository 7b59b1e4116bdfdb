//! Host-scoped keys in a key-value store.
//!
//! Keys written per sample:
//!
//! ```text
//! <hostname>.cpu.temperature        -> float (Celsius)
//! <hostname>.cpu.temperature.time   -> integer (unix seconds)
//! <hostname>.uptime                 -> string, only when the sample has one
//! ```
//!
//! Writes are independent `SET`s. The first failure stops the sequence, so
//! earlier keys keep their new values and later keys keep their old ones.

use tracing::trace;

use crate::sample::Sample;
use crate::sink::{Sink, SinkError};

/// The one store operation the sink needs.
pub trait KeyValueStore {
    /// Short name of the backend for log lines.
    fn backend(&self) -> &'static str;

    /// Sets `key` to `value`, overwriting any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SinkError>;
}

pub fn temperature_key(hostname: &str) -> String {
    format!("{}.cpu.temperature", hostname)
}

pub fn temperature_time_key(hostname: &str) -> String {
    format!("{}.cpu.temperature.time", hostname)
}

pub fn uptime_key(hostname: &str) -> String {
    format!("{}.uptime", hostname)
}

/// Writes each sample as host-scoped keys.
pub struct KvSink<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvSink<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> Sink for KvSink<S> {
    fn name(&self) -> &'static str {
        self.store.backend()
    }

    fn emit(&mut self, sample: &Sample) -> Result<(), SinkError> {
        let host = &sample.hostname;

        self.store
            .set(&temperature_key(host), &sample.temperature_text())?;
        self.store
            .set(&temperature_time_key(host), &sample.timestamp.to_string())?;
        if let Some(ref uptime) = sample.uptime {
            self.store.set(&uptime_key(host), uptime)?;
        }

        trace!(host = %host, "sample stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemoryStore;

    fn sample(uptime: Option<&str>) -> Sample {
        Sample {
            hostname: "host1".to_string(),
            temperature_celsius: 42.5,
            uptime: uptime.map(str::to_string),
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(temperature_key("host1"), "host1.cpu.temperature");
        assert_eq!(temperature_time_key("host1"), "host1.cpu.temperature.time");
        assert_eq!(uptime_key("host1"), "host1.uptime");
    }

    #[test]
    fn test_emit_writes_exactly_three_keys() {
        let mut sink = KvSink::new(MemoryStore::new());
        sink.emit(&sample(Some("up 3 days"))).unwrap();

        let entries: Vec<(&str, &str)> = sink.store().entries().collect();
        assert_eq!(
            entries,
            vec![
                ("host1.cpu.temperature", "42.5"),
                ("host1.cpu.temperature.time", "1700000000"),
                ("host1.uptime", "up 3 days"),
            ]
        );
    }

    #[test]
    fn test_emit_whole_degrees_as_float() {
        let mut s = sample(None);
        s.temperature_celsius = 45000.0 / 1000.0;

        let mut sink = KvSink::new(MemoryStore::new());
        sink.emit(&s).unwrap();
        assert_eq!(sink.store().get("host1.cpu.temperature"), Some("45.0"));
    }

    #[test]
    fn test_emit_without_uptime_skips_uptime_key() {
        let mut sink = KvSink::new(MemoryStore::new());
        sink.emit(&sample(None)).unwrap();

        assert_eq!(sink.store().len(), 2);
        assert_eq!(sink.store().get("host1.uptime"), None);
    }

    #[test]
    fn test_emit_without_uptime_leaves_previous_uptime() {
        let mut store = MemoryStore::new();
        store.set("host1.uptime", "up 1 day").unwrap();

        let mut sink = KvSink::new(store);
        sink.emit(&sample(None)).unwrap();
        assert_eq!(sink.store().get("host1.uptime"), Some("up 1 day"));
    }

    #[test]
    fn test_partial_failure_keeps_earlier_keys() {
        let mut store = MemoryStore::new();
        store.set("host1.cpu.temperature", "40").unwrap();
        store.set("host1.cpu.temperature.time", "1600000000").unwrap();
        store.set("host1.uptime", "up 1 day").unwrap();

        // Only the temperature write gets through.
        let mut sink = KvSink::new(store.fail_after(1));
        let err = sink.emit(&sample(Some("up 3 days"))).unwrap_err();
        assert!(matches!(err, SinkError::Connection { .. }));

        let store = sink.store();
        assert_eq!(store.get("host1.cpu.temperature"), Some("42.5"));
        assert_eq!(store.get("host1.cpu.temperature.time"), Some("1600000000"));
        assert_eq!(store.get("host1.uptime"), Some("up 1 day"));
    }

    #[test]
    fn test_unreachable_store_writes_nothing() {
        let mut sink = KvSink::new(MemoryStore::new().fail_after(0));
        assert!(sink.emit(&sample(Some("up 3 days"))).is_err());
        assert!(sink.store().is_empty());
    }
}
