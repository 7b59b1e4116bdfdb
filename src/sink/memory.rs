//! In-memory key-value store for tests and dry runs.

use std::collections::BTreeMap;

use crate::sink::SinkError;
use crate::sink::kv::KeyValueStore;

/// Ordered in-memory store with optional failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    /// Number of further `set` calls allowed before the store "goes away".
    remaining: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets the next `n` writes succeed; every write after that fails with
    /// [`SinkError::Connection`], as if the store went down.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.remaining = Some(n);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// All entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(SinkError::Connection {
                    address: "memory".to_string(),
                    message: "store unavailable".to_string(),
                });
            }
            *remaining -= 1;
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
