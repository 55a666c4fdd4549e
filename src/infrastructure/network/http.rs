// HTTP client utilities
use crate::domain::error::WeatherError;
use reqwest::Client;
use std::time::Duration;

/// Create the shared upstream HTTP client.
///
/// The timeout bounds every upstream round-trip; a request that exceeds it
/// is reported as unreachable rather than hanging the caller.
pub fn create_client(timeout_secs: u64) -> Result<Client, WeatherError> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("weathergate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| WeatherError::Internal(format!("failed to build HTTP client: {}", err)))
}
