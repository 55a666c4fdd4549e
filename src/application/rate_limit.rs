use crate::domain::error::WeatherError;
use crate::domain::model::RateLimitDecision;
use crate::domain::traits::KeyValueStore;
use std::sync::Arc;
use tracing::debug;

/// Route name used for the weather endpoint's counters.
pub const WEATHER_ROUTE: &str = "weather";

/// Bucket for callers that did not declare an identity. Collisions under
/// "no identity" are acceptable by design.
const ANONYMOUS: &str = "anonymous";

/// Fixed-window admission control over the shared store.
///
/// Each (identifier, route) pair gets a counter whose expiry is attached
/// atomically on the first increment of the window; the check itself is a
/// single atomic store operation, so concurrent requests never undercount.
///
/// If the store is unreachable the limiter fails closed: the error
/// propagates and the request is rejected, never admitted.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    limit: u64,
    window_secs: u64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, limit: u64, window_secs: u64) -> Self {
        Self {
            store,
            limit,
            window_secs,
        }
    }

    pub async fn check_and_consume(
        &self,
        identifier: Option<&str>,
        route: &str,
    ) -> Result<RateLimitDecision, WeatherError> {
        let bucket = identifier.filter(|id| !id.is_empty()).unwrap_or(ANONYMOUS);
        let key = format!("ratelimit:{}:{}", route, bucket);

        let hit = self.store.incr_window(&key, self.window_secs).await?;

        if hit.count <= self.limit {
            debug!(bucket, route, count = hit.count, "request admitted");
            return Ok(RateLimitDecision::Allowed);
        }

        // Round the remaining window up to whole seconds, never zero.
        let retry_after_secs = hit.remaining_ms.div_ceil(1000).max(1);
        debug!(bucket, route, count = hit.count, retry_after_secs, "request denied");

        Ok(RateLimitDecision::Denied { retry_after_secs })
    }
}
