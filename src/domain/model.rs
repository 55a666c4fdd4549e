use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cache entries live this long; expiry is enforced by the store itself.
pub const CACHE_TTL_SECS: u64 = 43_200;

/// The forecast is truncated to this many daily records.
pub const FORECAST_DAYS: usize = 7;

/// City codes are opaque and case-sensitive; no normalization here.
pub fn cache_key(city_code: &str) -> String {
    format!("weather:{}", city_code)
}

// Weather snapshot: the cache and the HTTP response share one wire shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub location: Value,
    pub current_conditions: Value,
    pub forecast: Vec<Value>,
    pub last_updated: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Build a snapshot from a raw upstream payload.
    ///
    /// Location and current conditions are copied verbatim; the forecast
    /// keeps the first [`FORECAST_DAYS`] entries in upstream order.
    pub fn from_upstream(payload: UpstreamTimeline, retrieved_at: DateTime<Utc>) -> Self {
        let mut forecast = payload.days;
        forecast.truncate(FORECAST_DAYS);

        Self {
            location: payload.address.unwrap_or(Value::Null),
            current_conditions: payload.current_conditions.unwrap_or(Value::Null),
            forecast,
            last_updated: retrieved_at,
        }
    }
}

/// Raw timeline payload as returned by the upstream weather provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamTimeline {
    pub address: Option<Value>,
    #[serde(rename = "currentConditions")]
    pub current_conditions: Option<Value>,
    #[serde(default)]
    pub days: Vec<Value>,
}

impl UpstreamTimeline {
    /// An upstream 200 with nothing usable in it counts as "not found".
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.current_conditions.is_none() && self.days.is_empty()
    }
}

// Admission check outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Denied { retry_after_secs: u64 },
}
