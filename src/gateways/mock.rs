use crate::gateways::{ChargeRequest, ChargeResponse, PaymentGateway, MOCKPSP};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const FORCED_TIMEOUT_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaultConfig {
    #[serde(default)]
    pub failure_rate: f64,
    #[serde(default)]
    pub add_latency_ms: u64,
    #[serde(default)]
    pub force_timeout: bool,
}

impl FaultConfig {
    pub fn sanitized(mut self) -> Self {
        self.failure_rate = if self.failure_rate.is_nan() {
            0.0
        } else {
            self.failure_rate.clamp(0.0, 1.0)
        };
        self
    }
}

/// Shared, operator-editable fault injection settings.
#[derive(Clone, Default)]
pub struct MockPspState {
    inner: Arc<RwLock<FaultConfig>>,
}

impl MockPspState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> FaultConfig {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, cfg: FaultConfig) -> FaultConfig {
        let cfg = cfg.sanitized();
        *self.inner.write().await = cfg.clone();
        cfg
    }
}

pub struct MockPspGateway {
    pub state: MockPspState,
    pub timeout_delay: Duration,
}

impl MockPspGateway {
    pub fn new(state: MockPspState) -> Self {
        Self {
            state,
            timeout_delay: FORCED_TIMEOUT_DELAY,
        }
    }

    pub fn with_timeout_delay(mut self, delay: Duration) -> Self {
        self.timeout_delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockPspGateway {
    fn name(&self) -> &str {
        MOCKPSP
    }

    async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeResponse> {
        let cfg = self.state.get().await;

        if cfg.force_timeout {
            tokio::time::sleep(self.timeout_delay).await;
            bail!("MockPSP forced timeout");
        }

        if cfg.add_latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(cfg.add_latency_ms)).await;
        }

        let r: f64 = rand::random();
        if r < cfg.failure_rate {
            Ok(ChargeResponse {
                success: false,
                message: Some("Mock decline".to_string()),
            })
        } else {
            Ok(ChargeResponse {
                success: true,
                message: Some("Mock approved".to_string()),
            })
        }
    }
}
