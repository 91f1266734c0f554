use crate::gateways::mock::FaultConfig;
use crate::http::extract::ValidJson;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatusView {
    pub provider: String,
    pub up: bool,
}

pub async fn list_providers(State(state): State<AppState>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(state.health.snapshot())).into_response()
}

/// `up` (any case) marks the provider up; any other status marks it down.
pub async fn set_provider_status(
    State(state): State<AppState>,
    Path((name, status)): Path<(String, String)>,
) -> impl IntoResponse {
    let up = status.eq_ignore_ascii_case("up");
    state.health.set(&name, up);
    tracing::info!(provider = %name, up, "provider health updated");
    (
        axum::http::StatusCode::OK,
        Json(ProviderStatusView { provider: name, up }),
    )
        .into_response()
}

pub async fn update_mockpsp_config(
    State(state): State<AppState>,
    ValidJson(cfg): ValidJson<FaultConfig>,
) -> impl IntoResponse {
    let applied = state.mockpsp.set(cfg).await;
    tracing::info!(
        failure_rate = applied.failure_rate,
        add_latency_ms = applied.add_latency_ms,
        force_timeout = applied.force_timeout,
        "mockpsp fault config updated"
    );
    (axum::http::StatusCode::OK, Json(applied)).into_response()
}
