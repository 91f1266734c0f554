use crate::scoring::types::{ProviderCandidate, RankedProvider, ScoreBreakdown, ScoreWeights};

/// Latency mapped to [0, 1], 1 being instant and 0 being a second or worse.
pub fn latency_score(avg_latency_ms: f64) -> f64 {
    1.0 - clamp01(avg_latency_ms / 1000.0)
}

pub fn clamp01(v: f64) -> f64 {
    if v < 0.0 {
        0.0
    } else if v > 1.0 {
        1.0
    } else {
        v
    }
}

pub fn score_provider(candidate: &ProviderCandidate, weights: &ScoreWeights) -> RankedProvider {
    let success_rate = clamp01(candidate.inputs.success_rate);
    let latency_component = latency_score(candidate.inputs.avg_latency_ms);
    let cost_weight = candidate.inputs.cost_weight;

    let final_score = (weights.success_rate_weight * success_rate)
        + (weights.latency_weight * latency_component)
        + (weights.cost_weight * cost_weight);

    RankedProvider {
        provider: candidate.provider.clone(),
        score: final_score,
        breakdown: ScoreBreakdown {
            success_rate,
            latency_score: latency_component,
            cost_weight,
            final_score,
        },
    }
}

/// Scores in candidate order, then sorts best-first. The sort is stable, so
/// equal scores keep their candidate order.
pub fn rank_providers(candidates: &[ProviderCandidate], weights: &ScoreWeights) -> Vec<RankedProvider> {
    let mut ranked: Vec<RankedProvider> = candidates
        .iter()
        .map(|candidate| score_provider(candidate, weights))
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

/// The strictly highest score wins; on a tie the earlier candidate is kept.
pub fn pick_best(candidates: &[ProviderCandidate], weights: &ScoreWeights) -> Option<RankedProvider> {
    let mut best: Option<RankedProvider> = None;
    for candidate in candidates {
        let scored = score_provider(candidate, weights);
        if best.as_ref().map_or(true, |b| scored.score > b.score) {
            best = Some(scored);
        }
    }
    best
}
