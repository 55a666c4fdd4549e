use crate::domain::error::WeatherError;
use crate::domain::model::UpstreamTimeline;
use crate::domain::traits::WeatherProvider;
use async_trait::async_trait;
use reqwest::Client;

/// Visual Crossing timeline API client.
///
/// The city code is appended to the base URL as-is; the provider treats it
/// as an opaque location descriptor.
pub struct VisualCrossingClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VisualCrossingClient {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl WeatherProvider for VisualCrossingClient {
    async fn fetch(&self, city_code: &str) -> Result<UpstreamTimeline, WeatherError> {
        let url = format!("{}/{}", self.base_url, city_code);
        let params = [
            ("unitGroup", "metric"),
            ("key", self.api_key.as_str()),
            ("contentType", "json"),
        ];

        // No response at all (connect failure, timeout) means unreachable;
        // anything with a status is mapped by code below.
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|err| WeatherError::UpstreamUnreachable(err.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => return Err(WeatherError::UpstreamAuth(status.as_u16())),
            404 => return Err(WeatherError::NotFound),
            code if !status.is_success() => return Err(WeatherError::Upstream(code)),
            _ => {}
        }

        response
            .json::<UpstreamTimeline>()
            .await
            .map_err(|err| WeatherError::Internal(format!("malformed upstream payload: {}", err)))
    }
}
