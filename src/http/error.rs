use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use crate::service::orchestrator::PaymentError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub fn envelope(code: &str, message: &str, details: Option<String>) -> Json<ErrorEnvelope> {
    Json(ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details,
        },
    })
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        match self {
            PaymentError::Validation { code, message } => {
                (StatusCode::BAD_REQUEST, envelope(code, &message, None)).into_response()
            }
            PaymentError::InProgress => {
                let mut resp = (
                    StatusCode::CONFLICT,
                    envelope("IDEMPOTENCY_IN_PROGRESS", &self.to_string(), None),
                )
                    .into_response();
                resp.headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
                resp
            }
            PaymentError::NotFound(_) => {
                (StatusCode::NOT_FOUND, envelope("NOT_FOUND", &self.to_string(), None)).into_response()
            }
            PaymentError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    envelope("INTERNAL", "internal error", Some(e.to_string())),
                )
                    .into_response()
            }
        }
    }
}
