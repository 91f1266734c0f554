use crate::domain::payment::{CreatePaymentRequest, CreatePaymentResponse, PaymentSearch};
use crate::http::extract::ValidJson;
use crate::http::middleware::correlation::CorrelationId;
use crate::service::orchestrator::PaymentError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use uuid::Uuid;

pub async fn create_payment(
    State(state): State<AppState>,
    correlation: Option<Extension<CorrelationId>>,
    ValidJson(req): ValidJson<CreatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentError> {
    if let Some(Extension(CorrelationId(id))) = &correlation {
        tracing::debug!(correlation_id = %id, idempotency_key = %req.idempotency_key, "payment received");
    }
    let payment = state.orchestrator.process(req).await?;
    Ok((
        axum::http::StatusCode::OK,
        Json(CreatePaymentResponse::from(&payment)),
    ))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, PaymentError> {
    let payment = state.orchestrator.get(payment_id).await?;
    Ok((
        axum::http::StatusCode::OK,
        Json(CreatePaymentResponse::from(&payment)),
    ))
}

pub async fn search_payments(
    State(state): State<AppState>,
    Query(search): Query<PaymentSearch>,
) -> Result<impl IntoResponse, PaymentError> {
    let page = state.orchestrator.search(&search).await?;
    Ok((axum::http::StatusCode::OK, Json(page)))
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}
