use crate::circuit::evaluator::pre_call_decision;
use crate::circuit::state::{CircuitDecision, CircuitOverride, CircuitSnapshot, CircuitState};
use crate::circuit::transitions::{admit, apply_transition};
use crate::config::CircuitSettings;
use dashmap::DashMap;

/// One breaker per provider. Each provider's state is read-modify-written
/// under its own map shard, so breakers never block each other.
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, CircuitSnapshot>,
    settings: CircuitSettings,
}

impl CircuitBreakerRegistry {
    pub fn new(settings: CircuitSettings) -> Self {
        Self {
            breakers: DashMap::new(),
            settings,
        }
    }

    pub fn acquire(&self, provider: &str) -> CircuitDecision {
        self.acquire_at(provider, chrono::Utc::now())
    }

    pub fn acquire_at(&self, provider: &str, now: chrono::DateTime<chrono::Utc>) -> CircuitDecision {
        let key = provider.to_lowercase();
        let mut entry = self
            .breakers
            .entry(key.clone())
            .or_insert_with(|| CircuitSnapshot::new(&key));

        let decision = pre_call_decision(&entry, now);
        if decision == CircuitDecision::Probe {
            let updated = admit(entry.clone(), true, now);
            *entry = updated;
            tracing::info!(provider = %key, "circuit half-open, admitting trial call");
        }
        decision
    }

    pub fn record(&self, provider: &str, failed: bool, was_probe: bool) {
        self.record_at(provider, failed, was_probe, chrono::Utc::now());
    }

    pub fn record_at(
        &self,
        provider: &str,
        failed: bool,
        was_probe: bool,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        let key = provider.to_lowercase();
        let mut entry = self
            .breakers
            .entry(key.clone())
            .or_insert_with(|| CircuitSnapshot::new(&key));

        let before = entry.state;
        let updated = apply_transition(entry.clone(), &self.settings, failed, was_probe, now);
        *entry = updated;

        match (before, entry.state) {
            (CircuitState::Closed, CircuitState::Open) => tracing::warn!(
                provider = %key,
                failure_rate = entry.failure_rate,
                "circuit opened"
            ),
            (CircuitState::HalfOpen, CircuitState::Open) => {
                tracing::warn!(provider = %key, "trial call failed, circuit re-opened")
            }
            (CircuitState::HalfOpen, CircuitState::Closed) => {
                tracing::info!(provider = %key, "trial call succeeded, circuit closed")
            }
            _ => {}
        }
    }

    /// Sets or clears the manual override. Clearing it also releases a
    /// half-open trial slot, so the next call is admitted as a fresh trial.
    pub fn set_override(&self, provider: &str, value: Option<CircuitOverride>) {
        let key = provider.to_lowercase();
        let mut entry = self
            .breakers
            .entry(key.clone())
            .or_insert_with(|| CircuitSnapshot::new(&key));
        entry.manual_override = value;
        if value.is_none() {
            entry.trial_in_flight = false;
        }
        entry.updated_at = chrono::Utc::now();
        tracing::info!(provider = %key, override_state = ?value, "circuit override updated");
    }

    pub fn snapshot(&self, provider: &str) -> CircuitSnapshot {
        let key = provider.to_lowercase();
        self.breakers
            .get(&key)
            .map(|s| s.clone())
            .unwrap_or_else(|| CircuitSnapshot::new(&key))
    }

    pub fn status(&self) -> Vec<CircuitSnapshot> {
        let mut out: Vec<CircuitSnapshot> = self.breakers.iter().map(|e| e.value().clone()).collect();
        out.sort_by(|a, b| a.provider.cmp(&b.provider));
        out
    }
}
