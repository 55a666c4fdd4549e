use crate::domain::error::WeatherError;
use std::env;
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_UPSTREAM_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RATE_LIMIT_MAX: u64 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 3600;

/// Process configuration, sourced from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub redis_url: String,
    pub upstream_api_key: String,
    pub upstream_base_url: String,
    pub upstream_timeout_secs: u64,
    pub rate_limit_max: u64,
    pub rate_limit_window_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, WeatherError> {
        let upstream_api_key = env::var("VISUAL_CROSSING_API_KEY")
            .map_err(|_| WeatherError::Config("VISUAL_CROSSING_API_KEY is not set".to_string()))?;
        if upstream_api_key.is_empty() {
            return Err(WeatherError::Config(
                "VISUAL_CROSSING_API_KEY is empty".to_string(),
            ));
        }

        Ok(Self {
            host: env_or("HOST", DEFAULT_HOST),
            port: env_parsed("PORT", DEFAULT_PORT)?,
            redis_url: env_or("REDIS_URL", DEFAULT_REDIS_URL),
            upstream_api_key,
            upstream_base_url: env_or("VISUAL_CROSSING_BASE_URL", DEFAULT_UPSTREAM_BASE_URL),
            upstream_timeout_secs: env_parsed("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS)?,
            rate_limit_max: env_parsed("RATE_LIMIT_MAX", DEFAULT_RATE_LIMIT_MAX)?,
            rate_limit_window_secs: env_parsed(
                "RATE_LIMIT_WINDOW_SECS",
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )?,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, WeatherError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err| WeatherError::Config(format!("invalid listen address: {}", err)))
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, WeatherError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|err| WeatherError::Config(format!("invalid {}: {}", name, err))),
        Err(_) => Ok(default),
    }
}
