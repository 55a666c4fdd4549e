use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::rate_limit::WEATHER_ROUTE;
use crate::domain::error::WeatherError;
use crate::domain::model::RateLimitDecision;
use crate::state::AppState;

/// Callers declare their rate-limit identity through this header.
const SERVICE_NAME_HEADER: &str = "service-name";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/weather/:city_code", get(get_weather))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: fixed payload, no limiter, no store.
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK" }))
}

async fn get_weather(
    State(state): State<Arc<AppState>>,
    Path(city_code): Path<String>,
    headers: HeaderMap,
) -> Response {
    let identifier = headers
        .get(SERVICE_NAME_HEADER)
        .and_then(|value| value.to_str().ok());

    // Admission first: a denied request never reaches the weather pipeline.
    match state.limiter.check_and_consume(identifier, WEATHER_ROUTE).await {
        Ok(RateLimitDecision::Allowed) => {}
        Ok(RateLimitDecision::Denied { retry_after_secs }) => {
            return WeatherError::RateLimited(retry_after_secs).into_response();
        }
        Err(err) => return err.into_response(),
    }

    match state.weather.get_weather(&city_code).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let status = match &self {
            WeatherError::InvalidInput => StatusCode::BAD_REQUEST,
            WeatherError::NotFound => StatusCode::NOT_FOUND,
            // Upstream statuses propagate verbatim to the caller.
            WeatherError::UpstreamAuth(code) | WeatherError::Upstream(code) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            WeatherError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            // Fail closed: an unreachable store rejects the request.
            WeatherError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            WeatherError::UpstreamUnreachable(_)
            | WeatherError::CacheCorruption(_)
            | WeatherError::Config(_)
            | WeatherError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));

        if let WeatherError::RateLimited(retry_after_secs) = self {
            let headers = [(header::RETRY_AFTER, retry_after_secs.to_string())];
            return (status, headers, body).into_response();
        }

        (status, body).into_response()
    }
}
