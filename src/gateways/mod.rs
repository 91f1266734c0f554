use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod mock;
pub mod stripe;

pub const STRIPE: &str = "stripe";
pub const MOCKPSP: &str = "mockpsp";

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub idempotency_key: String,
}

/// What a provider answered. `success = false` is a business decline, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChargeResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// A PSP backend. Returning `Err` signals a transport-level failure
/// (network error, timeout), which is what makes the orchestrator fail over.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse>;
}

/// Fixed, ordered provider list. Order is the router's tie-break order.
#[derive(Clone)]
pub struct GatewaySet {
    entries: Vec<(String, Arc<dyn PaymentGateway>)>,
}

impl GatewaySet {
    /// The first entry is the designated primary used when everything is down.
    pub fn new(gateways: Vec<Arc<dyn PaymentGateway>>) -> Result<Self> {
        if gateways.is_empty() {
            bail!("at least one payment gateway must be configured");
        }
        let entries = gateways
            .into_iter()
            .map(|g| (g.name().to_lowercase(), g))
            .collect();
        Ok(Self { entries })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn primary(&self) -> (&str, Arc<dyn PaymentGateway>) {
        let (name, gateway) = &self.entries[0];
        (name.as_str(), gateway.clone())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PaymentGateway>> {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, g)| g.clone())
    }
}

/// Per-provider cost weight used by the scoring engine. MockPSP is the cheap one.
pub fn cost_weight(provider: &str) -> f64 {
    match provider {
        MOCKPSP => 0.8,
        STRIPE => 0.4,
        _ => 0.5,
    }
}

/// `[stripe, mockpsp]`, stripe first.
pub fn default_providers(mockpsp: &mock::MockPspState) -> Vec<Arc<dyn PaymentGateway>> {
    let premium: Arc<dyn PaymentGateway> = Arc::new(stripe::StripeStubGateway);
    let cheap: Arc<dyn PaymentGateway> = Arc::new(mock::MockPspGateway::new(mockpsp.clone()));
    vec![premium, cheap]
}
