use crate::circuit::state::{CircuitDecision, CircuitOverride, CircuitSnapshot, CircuitState};

pub fn pre_call_decision(
    snapshot: &CircuitSnapshot,
    now: chrono::DateTime<chrono::Utc>,
) -> CircuitDecision {
    match snapshot.manual_override {
        Some(CircuitOverride::ForceOpen) => {
            return CircuitDecision::Reject("circuit forced open".to_string())
        }
        Some(CircuitOverride::ForceClosed) => return CircuitDecision::Allow,
        None => {}
    }

    match snapshot.state {
        CircuitState::Closed => CircuitDecision::Allow,
        CircuitState::Open => {
            if snapshot.cooldown_until.is_some_and(|t| now >= t) && !snapshot.trial_in_flight {
                CircuitDecision::Probe
            } else {
                CircuitDecision::Reject("circuit open".to_string())
            }
        }
        CircuitState::HalfOpen => {
            if snapshot.trial_in_flight {
                CircuitDecision::Reject("half-open trial in flight".to_string())
            } else {
                CircuitDecision::Probe
            }
        }
    }
}
