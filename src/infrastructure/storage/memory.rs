use crate::domain::error::StoreError;
use crate::domain::traits::{KeyValueStore, WindowHit};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct ValueEntry {
    bytes: Vec<u8>,
    expires_at: Instant,
}

struct CounterEntry {
    count: u64,
    expires_at: Instant,
}

/// In-process store with the same expiry semantics as the Redis backend.
///
/// Used by the test suite and for running without an external store. The
/// dashmap entry API holds a shard write lock for the whole
/// increment-and-expire step, which gives `incr_window` its atomicity.
#[derive(Default)]
pub struct MemoryStore {
    values: DashMap<String, ValueEntry>,
    counters: DashMap<String, CounterEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let expired = match self.values.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.bytes.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            // Lazy eviction; the guard above is already dropped here.
            self.values
                .remove_if(key, |_, entry| entry.expires_at <= Instant::now());
        }

        Ok(None)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        self.values.insert(
            key.to_string(),
            ValueEntry {
                bytes: value.to_vec(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<WindowHit, StoreError> {
        let now = Instant::now();
        let window = Duration::from_secs(window_secs);

        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| CounterEntry {
                count: 0,
                expires_at: now + window,
            });

        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + window;
        }
        entry.count += 1;

        let remaining_ms = entry.expires_at.duration_since(now).as_millis() as u64;

        Ok(WindowHit {
            count: entry.count,
            remaining_ms,
        })
    }
}
