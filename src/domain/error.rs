use thiserror::Error;

/// Error returned by the key-value store capability.
#[derive(Error, Debug)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("city code is required")]
    InvalidInput,

    #[error("weather data not found")]
    NotFound,

    #[error("API key error or quota exceeded (upstream status {0})")]
    UpstreamAuth(u16),

    #[error("weather service error: upstream status {0}")]
    Upstream(u16),

    #[error("error connecting to weather service: {0}")]
    UpstreamUnreachable(String),

    #[error("cached entry is corrupt: {0}")]
    CacheCorruption(String),

    #[error("too many requests, retry after {0} seconds")]
    RateLimited(u64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal server error: {0}")]
    Internal(String),
}
