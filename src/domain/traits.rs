use crate::domain::error::{StoreError, WeatherError};
use crate::domain::model::UpstreamTimeline;
use async_trait::async_trait;

/// Result of one atomic counter increment within a rate-limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Counter value after this increment.
    pub count: u64,
    /// Milliseconds left until the window expires.
    pub remaining_ms: u64,
}

/// Trait for the external key-value store
///
/// The store owns expiry: values written with a TTL disappear on their own,
/// and the window counter attaches its expiry atomically on first increment.
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch raw bytes by key, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write raw bytes under a key with a TTL in seconds.
    async fn set_with_expiry(
        &self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), StoreError>;

    /// Atomically increment a window counter, setting the window expiry on
    /// the first hit. Two concurrent calls must never both observe the
    /// first hit, and the count must never undercount.
    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<WindowHit, StoreError>;
}

/// Trait for upstream weather providers
///
/// Implementations map provider-specific failures onto the shared error
/// taxonomy so the service layer stays provider-agnostic.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the raw timeline payload for a city code.
    async fn fetch(&self, city_code: &str) -> Result<UpstreamTimeline, WeatherError>;
}
