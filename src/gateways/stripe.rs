use crate::gateways::{ChargeRequest, ChargeResponse, PaymentGateway, STRIPE};
use anyhow::Result;

/// Stand-in for the premium provider: approves everything.
pub struct StripeStubGateway;

#[async_trait::async_trait]
impl PaymentGateway for StripeStubGateway {
    fn name(&self) -> &str {
        STRIPE
    }

    async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeResponse> {
        Ok(ChargeResponse {
            success: true,
            message: Some("Stripe approved".to_string()),
        })
    }
}
