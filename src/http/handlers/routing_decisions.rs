use crate::service::orchestrator::PaymentError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

/// Decisions for one payment, oldest first. Unknown payments yield an
/// empty list.
pub async fn list_decisions(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, PaymentError> {
    let rows = state.orchestrator.decisions(payment_id).await?;
    Ok((axum::http::StatusCode::OK, Json(rows)))
}
