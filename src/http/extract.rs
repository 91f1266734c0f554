use crate::service::orchestrator::PaymentError;
use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;

/// `Json<T>` whose rejections (bad syntax, missing fields, wrong content
/// type) come back as a 400 `MALFORMED_REQUEST` envelope.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = PaymentError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(PaymentError::Validation {
                code: "MALFORMED_REQUEST",
                message: rejection.body_text(),
            }),
        }
    }
}
