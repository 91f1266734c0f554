use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot(&state.stats);
    (axum::http::StatusCode::OK, Json(snapshot)).into_response()
}
