use crate::application::rate_limit::RateLimiter;
use crate::application::weather::WeatherService;
use crate::domain::traits::{KeyValueStore, WeatherProvider};
use std::sync::Arc;

/// Process-wide handles: constructed once at startup, injected everywhere.
///
/// All cross-request coordination lives in the shared store, so this holds
/// no locks of its own.
pub struct AppState {
    pub weather: WeatherService,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        upstream: Arc<dyn WeatherProvider>,
        rate_limit_max: u64,
        rate_limit_window_secs: u64,
    ) -> Self {
        Self {
            weather: WeatherService::new(Arc::clone(&store), upstream),
            limiter: RateLimiter::new(store, rate_limit_max, rate_limit_window_secs),
        }
    }
}
