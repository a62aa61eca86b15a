use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    upstream_base_url: String,
    bot_version: String,
}

impl HealthState {
    pub fn new(upstream_base_url: impl Into<String>, bot_version: impl Into<String>) -> Self {
        Self { upstream_base_url: upstream_base_url.into(), bot_version: bot_version.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub upstream: HealthCheck,
    pub bot_version: String,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Liveness only. The upstream is reported as configured and never probed.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "urbano-server runtime initialized".to_string(),
        },
        upstream: HealthCheck { status: "configured", detail: state.upstream_base_url.clone() },
        bot_version: state.bot_version.clone(),
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
