use crate::gateways::cost_weight;
use crate::registry::stats::ProviderStatsRegistry;
use crate::scoring::types::{ProviderCandidate, ScoreInputs};

pub fn read_inputs_for_provider(stats: &ProviderStatsRegistry, provider: &str) -> ScoreInputs {
    let stat = stats.get(provider);
    ScoreInputs {
        success_rate: stat.success_rate(),
        avg_latency_ms: stat.avg_latency_ms,
        cost_weight: cost_weight(provider),
    }
}

pub fn build_candidates<'a>(
    stats: &ProviderStatsRegistry,
    providers: impl IntoIterator<Item = &'a str>,
) -> Vec<ProviderCandidate> {
    providers
        .into_iter()
        .map(|provider| ProviderCandidate {
            provider: provider.to_string(),
            inputs: read_inputs_for_provider(stats, provider),
        })
        .collect()
}
