use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedView {
    pub provider: String,
    pub up: bool,
    pub score: f64,
    pub success_rate: f64,
    pub latency_score: f64,
    pub cost_weight: f64,
}

/// Current ranking over all providers, health ignored, plus the provider
/// `choose_provider` would pick right now.
pub async fn scoring_debug(State(state): State<AppState>) -> impl IntoResponse {
    let ranked: Vec<RankedView> = state
        .router
        .rank()
        .into_iter()
        .map(|(r, up)| RankedView {
            provider: r.provider,
            up,
            score: r.score,
            success_rate: r.breakdown.success_rate,
            latency_score: r.breakdown.latency_score,
            cost_weight: r.breakdown.cost_weight,
        })
        .collect();
    let chosen = state.router.choose_provider();

    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({
            "chosen": chosen.provider,
            "reason": chosen.reason,
            "ranked": ranked,
        })),
    )
        .into_response()
}
