#[derive(Debug, Clone)]
pub struct ScoreInputs {
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub cost_weight: f64,
}

#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub success_rate_weight: f64,
    pub latency_weight: f64,
    pub cost_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            success_rate_weight: 0.4,
            latency_weight: 0.4,
            cost_weight: 0.2,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScoreBreakdown {
    pub success_rate: f64,
    pub latency_score: f64,
    pub cost_weight: f64,
    pub final_score: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RankedProvider {
    pub provider: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone)]
pub struct ProviderCandidate {
    pub provider: String,
    pub inputs: ScoreInputs,
}
