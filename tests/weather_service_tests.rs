//! Cache-aside behavior of the weather service against stubbed capabilities.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use weathergate::application::weather::WeatherService;
use weathergate::domain::error::{StoreError, WeatherError};
use weathergate::domain::model::{cache_key, UpstreamTimeline};
use weathergate::domain::traits::{KeyValueStore, WeatherProvider, WindowHit};
use weathergate::infrastructure::storage::memory::MemoryStore;

enum Scripted {
    Payload(UpstreamTimeline),
    Auth(u16),
    Status(u16),
    Unreachable,
    NotFound,
}

struct StubUpstream {
    script: Scripted,
    calls: AtomicUsize,
}

impl StubUpstream {
    fn new(script: Scripted) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for StubUpstream {
    async fn fetch(&self, _city_code: &str) -> Result<UpstreamTimeline, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Scripted::Payload(payload) => Ok(payload.clone()),
            Scripted::Auth(code) => Err(WeatherError::UpstreamAuth(*code)),
            Scripted::Status(code) => Err(WeatherError::Upstream(*code)),
            Scripted::Unreachable => Err(WeatherError::UpstreamUnreachable(
                "connection timed out".to_string(),
            )),
            Scripted::NotFound => Err(WeatherError::NotFound),
        }
    }
}

/// Store wrapper counting reads and writes, with optional fault injection.
struct CountingStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
    fail_get: bool,
    fail_set: bool,
}

impl CountingStore {
    fn new() -> Arc<Self> {
        Self::with_faults(false, false)
    }

    fn with_faults(fail_get: bool, fail_set: bool) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            fail_get,
            fail_set,
        })
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_get {
            return Err(StoreError("injected read failure".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_set {
            return Err(StoreError("injected write failure".to_string()));
        }
        self.inner.set_with_expiry(key, value, ttl_secs).await
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<WindowHit, StoreError> {
        self.inner.incr_window(key, window_secs).await
    }
}

fn timeline(days: usize) -> UpstreamTimeline {
    UpstreamTimeline {
        address: Some(json!("London,UK")),
        current_conditions: Some(json!({ "temp": 18.2, "conditions": "Partially cloudy" })),
        days: (0..days)
            .map(|i| json!({ "datetime": format!("2026-08-{:02}", i + 1), "tempmax": 20 + i }))
            .collect(),
    }
}

fn service(store: Arc<CountingStore>, upstream: Arc<StubUpstream>) -> WeatherService {
    WeatherService::new(store, upstream)
}

#[tokio::test]
async fn empty_city_code_rejected_without_io() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Payload(timeline(3)));
    let svc = service(store.clone(), upstream.clone());

    for city in ["", "   "] {
        let err = svc.get_weather(city).await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidInput));
    }

    assert_eq!(store.gets.load(Ordering::SeqCst), 0);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn cache_miss_fetches_then_hit_skips_upstream() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Payload(timeline(3)));
    let svc = service(store.clone(), upstream.clone());

    let first = svc.get_weather("London,UK").await.unwrap();
    assert_eq!(upstream.calls(), 1);
    assert_eq!(store.sets.load(Ordering::SeqCst), 1);

    // Repeated lookups within the TTL serve the identical snapshot with
    // zero further upstream calls and no re-write.
    for _ in 0..3 {
        let again = svc.get_weather("London,UK").await.unwrap();
        assert_eq!(again, first);
    }
    assert_eq!(upstream.calls(), 1);
    assert_eq!(store.sets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_entry_triggers_one_fresh_fetch() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Payload(timeline(3)));
    let svc = service(store.clone(), upstream.clone());

    let first = svc.get_weather("London,UK").await.unwrap();
    assert_eq!(upstream.calls(), 1);

    // Force the entry past its TTL; the store enforces expiry on its own.
    store
        .inner
        .set_with_expiry(
            &cache_key("London,UK"),
            &serde_json::to_vec(&first).unwrap(),
            0,
        )
        .await
        .unwrap();

    let refreshed = svc.get_weather("London,UK").await.unwrap();
    assert_eq!(upstream.calls(), 2);
    assert_eq!(refreshed.forecast.len(), 3);

    // And the refetch repopulated the cache.
    let _ = svc.get_weather("London,UK").await.unwrap();
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn forecast_truncated_to_seven_in_order() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Payload(timeline(10)));
    let svc = service(store, upstream);

    let snapshot = svc.get_weather("Paris").await.unwrap();
    assert_eq!(snapshot.forecast.len(), 7);
    for (i, day) in snapshot.forecast.iter().enumerate() {
        assert_eq!(day["datetime"], format!("2026-08-{:02}", i + 1));
    }
}

#[tokio::test]
async fn short_forecast_kept_whole() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Payload(timeline(3)));
    let svc = service(store, upstream);

    let snapshot = svc.get_weather("Paris").await.unwrap();
    assert_eq!(snapshot.forecast.len(), 3);
}

#[tokio::test]
async fn upstream_auth_error_propagates_and_is_not_cached() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Auth(403));
    let svc = service(store.clone(), upstream.clone());

    let err = svc.get_weather("Berlin").await.unwrap_err();
    assert!(matches!(err, WeatherError::UpstreamAuth(403)));
    assert_eq!(store.sets.load(Ordering::SeqCst), 0);

    // No automatic retry, no negative caching: the next call hits upstream.
    let _ = svc.get_weather("Berlin").await.unwrap_err();
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn upstream_status_error_carries_code() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Status(502));
    let svc = service(store.clone(), upstream);

    let err = svc.get_weather("Berlin").await.unwrap_err();
    assert!(matches!(err, WeatherError::Upstream(502)));
    assert_eq!(store.sets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_timeout_maps_to_unreachable() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Unreachable);
    let svc = service(store, upstream);

    let err = svc.get_weather("Oslo").await.unwrap_err();
    assert!(matches!(err, WeatherError::UpstreamUnreachable(_)));
}

#[tokio::test]
async fn upstream_not_found_propagates() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::NotFound);
    let svc = service(store.clone(), upstream);

    let err = svc.get_weather("Nowhere").await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound));
    assert_eq!(store.sets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_upstream_payload_is_not_found() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Payload(UpstreamTimeline::default()));
    let svc = service(store.clone(), upstream);

    let err = svc.get_weather("Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound));
    assert_eq!(store.sets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn corrupt_cache_entry_falls_back_to_upstream_and_heals() {
    let store = CountingStore::new();
    let upstream = StubUpstream::new(Scripted::Payload(timeline(5)));
    let svc = service(store.clone(), upstream.clone());

    store
        .inner
        .set_with_expiry(&cache_key("London,UK"), b"{not json", 60)
        .await
        .unwrap();

    let snapshot = svc.get_weather("London,UK").await.unwrap();
    assert_eq!(snapshot.forecast.len(), 5);
    assert_eq!(upstream.calls(), 1);

    // The fresh snapshot overwrote the corrupt entry.
    let again = svc.get_weather("London,UK").await.unwrap();
    assert_eq!(again, snapshot);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn cache_read_failure_treated_as_miss() {
    let store = CountingStore::with_faults(true, false);
    let upstream = StubUpstream::new(Scripted::Payload(timeline(2)));
    let svc = service(store, upstream.clone());

    let snapshot = svc.get_weather("Madrid").await.unwrap();
    assert_eq!(snapshot.forecast.len(), 2);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn cache_write_failure_still_returns_snapshot() {
    let store = CountingStore::with_faults(false, true);
    let upstream = StubUpstream::new(Scripted::Payload(timeline(2)));
    let svc = service(store.clone(), upstream);

    let snapshot = svc.get_weather("Madrid").await.unwrap();
    assert_eq!(snapshot.forecast.len(), 2);
    assert_eq!(store.sets.load(Ordering::SeqCst), 1);
}
