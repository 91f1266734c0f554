use crate::circuit::registry::CircuitBreakerRegistry;
use crate::circuit::state::CircuitDecision;
use crate::gateways::{ChargeRequest, PaymentGateway};
use std::time::{Duration, Instant};

/// Result of one guarded provider call. Only `TransportFailure` is eligible
/// for failover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Approved { message: Option<String> },
    Declined { message: Option<String> },
    TransportFailure { error: String, rejected: bool },
}

impl CallOutcome {
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, CallOutcome::TransportFailure { .. })
    }
}

#[derive(Debug, Clone)]
pub struct GuardedCall {
    pub outcome: CallOutcome,
    pub latency_ms: u64,
}

/// Holds a half-open trial slot. Dropped while still armed (the caller's
/// future was cancelled mid-call), it records a failed trial and the breaker
/// re-opens.
struct TrialSlot<'a> {
    breakers: &'a CircuitBreakerRegistry,
    provider: &'a str,
    armed: bool,
}

impl Drop for TrialSlot<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(provider = self.provider, "trial call abandoned, circuit re-opened");
            self.breakers.record(self.provider, true, true);
        }
    }
}

/// Runs `gateway.charge` behind the provider's breaker and a timeout. A
/// breaker rejection, a timeout and an `Err` from the gateway all come back
/// as `TransportFailure`.
pub async fn guarded_charge(
    breakers: &CircuitBreakerRegistry,
    gateway: &dyn PaymentGateway,
    request: &ChargeRequest,
    timeout: Duration,
) -> GuardedCall {
    let provider = gateway.name();
    let was_probe = match breakers.acquire(provider) {
        CircuitDecision::Allow => false,
        CircuitDecision::Probe => true,
        CircuitDecision::Reject(reason) => {
            tracing::warn!(provider, %reason, "call rejected by circuit breaker");
            return GuardedCall {
                outcome: CallOutcome::TransportFailure {
                    error: reason,
                    rejected: true,
                },
                latency_ms: 0,
            };
        }
    };

    let mut trial = was_probe.then(|| TrialSlot {
        breakers,
        provider,
        armed: true,
    });

    let start = Instant::now();
    let result = tokio::time::timeout(timeout, gateway.charge(request)).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let outcome = match result {
        Ok(Ok(resp)) if resp.success => CallOutcome::Approved {
            message: resp.message,
        },
        Ok(Ok(resp)) => CallOutcome::Declined {
            message: resp.message,
        },
        Ok(Err(e)) => CallOutcome::TransportFailure {
            error: e.to_string(),
            rejected: false,
        },
        Err(_) => CallOutcome::TransportFailure {
            error: format!("timed out after {} ms", timeout.as_millis()),
            rejected: false,
        },
    };

    if let Some(slot) = trial.as_mut() {
        slot.armed = false;
    }
    breakers.record(provider, outcome.is_transport_failure(), was_probe);

    GuardedCall { outcome, latency_ms }
}
