use crate::circuit::state::{CircuitSnapshot, CircuitState};
use crate::config::CircuitSettings;

/// Marks a call as admitted. A probe takes the single half-open trial slot.
pub fn admit(
    mut snapshot: CircuitSnapshot,
    was_probe: bool,
    now: chrono::DateTime<chrono::Utc>,
) -> CircuitSnapshot {
    if was_probe {
        snapshot.state = CircuitState::HalfOpen;
        snapshot.trial_in_flight = true;
        snapshot.updated_at = now;
    }
    snapshot
}

/// Folds one finished call into the breaker. `failed` is a transport-level
/// failure; business declines are passed as `failed = false`.
pub fn apply_transition(
    mut snapshot: CircuitSnapshot,
    settings: &CircuitSettings,
    failed: bool,
    was_probe: bool,
    now: chrono::DateTime<chrono::Utc>,
) -> CircuitSnapshot {
    if was_probe {
        snapshot.trial_in_flight = false;
        if failed {
            trip(&mut snapshot, settings, now);
        } else {
            close(&mut snapshot);
        }
        snapshot.updated_at = now;
        return snapshot;
    }

    if snapshot.state == CircuitState::Closed {
        snapshot.outcomes.push_back(failed);
        while snapshot.outcomes.len() > settings.window_size.max(1) {
            snapshot.outcomes.pop_front();
        }
        let failures = snapshot.outcomes.iter().filter(|f| **f).count();
        snapshot.failure_rate = failures as f64 / snapshot.outcomes.len() as f64;

        if snapshot.outcomes.len() >= settings.minimum_calls.max(1)
            && snapshot.failure_rate >= settings.failure_rate_threshold
        {
            trip(&mut snapshot, settings, now);
        }
    }

    snapshot.updated_at = now;
    snapshot
}

fn trip(snapshot: &mut CircuitSnapshot, settings: &CircuitSettings, now: chrono::DateTime<chrono::Utc>) {
    snapshot.state = CircuitState::Open;
    snapshot.opened_at = Some(now);
    snapshot.cooldown_until = Some(now + chrono::Duration::seconds(settings.cooldown_secs as i64));
    snapshot.outcomes.clear();
}

fn close(snapshot: &mut CircuitSnapshot) {
    snapshot.state = CircuitState::Closed;
    snapshot.outcomes.clear();
    snapshot.failure_rate = 0.0;
    snapshot.opened_at = None;
    snapshot.cooldown_until = None;
}
