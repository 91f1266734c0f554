use crate::circuit::state::CircuitOverride;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

/// Every known provider, including ones whose breaker has not seen a call.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let rows: Vec<_> = state
        .router
        .gateways()
        .names()
        .map(|name| state.breakers.snapshot(name))
        .collect();
    (axum::http::StatusCode::OK, Json(rows)).into_response()
}

pub async fn force_open(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    apply_override(&state, &provider, Some(CircuitOverride::ForceOpen))
}

pub async fn force_close(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    apply_override(&state, &provider, Some(CircuitOverride::ForceClosed))
}

pub async fn reset(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    apply_override(&state, &provider, None)
}

fn apply_override(
    state: &AppState,
    provider: &str,
    value: Option<CircuitOverride>,
) -> axum::response::Response {
    if state.router.gateways().get(provider).is_none() {
        return (
            axum::http::StatusCode::NOT_FOUND,
            crate::http::error::envelope("UNKNOWN_PROVIDER", "unknown provider", Some(provider.to_string())),
        )
            .into_response();
    }
    state.breakers.set_override(provider, value);
    (
        axum::http::StatusCode::OK,
        Json(state.breakers.snapshot(provider)),
    )
        .into_response()
}
