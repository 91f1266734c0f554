use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitOverride {
    ForceOpen,
    ForceClosed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitSnapshot {
    pub provider: String,
    pub state: CircuitState,
    /// Most recent call outcomes while closed, `true` meaning failure.
    #[serde(skip)]
    pub outcomes: VecDeque<bool>,
    pub failure_rate: f64,
    pub opened_at: Option<chrono::DateTime<chrono::Utc>>,
    pub cooldown_until: Option<chrono::DateTime<chrono::Utc>>,
    pub trial_in_flight: bool,
    pub manual_override: Option<CircuitOverride>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl CircuitSnapshot {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            state: CircuitState::Closed,
            outcomes: VecDeque::new(),
            failure_rate: 0.0,
            opened_at: None,
            cooldown_until: None,
            trial_in_flight: false,
            manual_override: None,
            updated_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitDecision {
    Allow,
    Probe,
    Reject(String),
}
