use crate::domain::error::WeatherError;
use crate::domain::model::{cache_key, WeatherSnapshot, CACHE_TTL_SECS};
use crate::domain::traits::{KeyValueStore, WeatherProvider};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache-aside weather lookup for a single city code.
///
/// Per request: validate, check the store, fall through to the upstream
/// provider on a miss, write the fresh snapshot back with a TTL. The store
/// and provider handles are injected so tests can substitute fakes.
pub struct WeatherService {
    store: Arc<dyn KeyValueStore>,
    upstream: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(store: Arc<dyn KeyValueStore>, upstream: Arc<dyn WeatherProvider>) -> Self {
        Self { store, upstream }
    }

    pub async fn get_weather(&self, city_code: &str) -> Result<WeatherSnapshot, WeatherError> {
        let city_code = city_code.trim();
        if city_code.is_empty() {
            return Err(WeatherError::InvalidInput);
        }

        let key = cache_key(city_code);

        // 1. Cache lookup. Read errors and corrupt entries degrade to a
        //    miss so the endpoint stays available while the store misbehaves.
        match self.lookup_cached(&key).await {
            Ok(Some(snapshot)) => {
                info!(city_code, "serving cached data");
                return Ok(snapshot);
            }
            Ok(None) => {
                debug!(city_code, "cache miss");
            }
            Err(err) => {
                warn!(city_code, %err, "cache read failed, falling through to upstream");
            }
        }

        // 2. Upstream fetch. Failures propagate verbatim, never retried,
        //    never cached.
        let payload = self.upstream.fetch(city_code).await?;
        if payload.is_empty() {
            return Err(WeatherError::NotFound);
        }

        let snapshot = WeatherSnapshot::from_upstream(payload, Utc::now());

        // 3. Best-effort cache write: the snapshot is returned even if the
        //    write fails.
        match serde_json::to_vec(&snapshot) {
            Ok(bytes) => {
                if let Err(err) = self
                    .store
                    .set_with_expiry(&key, &bytes, CACHE_TTL_SECS)
                    .await
                {
                    warn!(city_code, %err, "cache write failed, returning snapshot anyway");
                }
            }
            Err(err) => {
                warn!(city_code, %err, "snapshot serialization failed, skipping cache write");
            }
        }

        Ok(snapshot)
    }

    async fn lookup_cached(&self, key: &str) -> Result<Option<WeatherSnapshot>, WeatherError> {
        let Some(bytes) = self.store.get(key).await? else {
            return Ok(None);
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| WeatherError::CacheCorruption(err.to_string()))
    }
}
