use crate::gateways::{GatewaySet, PaymentGateway};
use crate::registry::health::ProviderHealthRegistry;
use crate::registry::stats::ProviderStatsRegistry;
use crate::scoring::engine::{pick_best, rank_providers};
use crate::scoring::metrics_reader::build_candidates;
use crate::scoring::types::{RankedProvider, ScoreWeights};
use std::sync::Arc;

pub const ALL_DOWN_REASON: &str = "all-down-degrade";
pub const NO_ALTERNATIVE_REASON: &str = "no-alternative";

#[derive(Clone)]
pub struct Decision {
    pub provider: String,
    pub gateway: Arc<dyn PaymentGateway>,
    pub reason: String,
}

impl std::fmt::Debug for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decision")
            .field("provider", &self.provider)
            .field("reason", &self.reason)
            .finish()
    }
}

/// Result of asking for a provider other than the one that just failed.
/// `NoAlternative` names the excluded provider and must not be treated as a
/// reroute.
#[derive(Debug, Clone)]
pub enum FailoverChoice {
    Alternate(Decision),
    NoAlternative(Decision),
}

pub struct ProviderRouter {
    gateways: GatewaySet,
    health: Arc<ProviderHealthRegistry>,
    stats: Arc<ProviderStatsRegistry>,
    weights: ScoreWeights,
}

impl ProviderRouter {
    pub fn new(
        gateways: GatewaySet,
        health: Arc<ProviderHealthRegistry>,
        stats: Arc<ProviderStatsRegistry>,
    ) -> Self {
        Self {
            gateways,
            health,
            stats,
            weights: ScoreWeights::default(),
        }
    }

    pub fn gateways(&self) -> &GatewaySet {
        &self.gateways
    }

    pub fn choose_provider(&self) -> Decision {
        let candidates: Vec<&str> = self
            .gateways
            .names()
            .filter(|name| self.health.is_up(name))
            .collect();

        match self.best_of(&candidates) {
            Some(decision) => decision,
            None => {
                let (name, gateway) = self.gateways.primary();
                Decision {
                    provider: name.to_string(),
                    gateway,
                    reason: ALL_DOWN_REASON.to_string(),
                }
            }
        }
    }

    pub fn choose_provider_excluding(&self, exclude: &str) -> FailoverChoice {
        let exclude = exclude.to_lowercase();
        let candidates: Vec<&str> = self
            .gateways
            .names()
            .filter(|name| self.health.is_up(name) && *name != exclude)
            .collect();

        match self.best_of(&candidates) {
            Some(decision) => FailoverChoice::Alternate(decision),
            None => {
                let gateway = self
                    .gateways
                    .get(&exclude)
                    .unwrap_or_else(|| self.gateways.primary().1);
                FailoverChoice::NoAlternative(Decision {
                    provider: exclude,
                    gateway,
                    reason: NO_ALTERNATIVE_REASON.to_string(),
                })
            }
        }
    }

    pub fn report(&self, provider: &str, success: bool, latency_ms: u64) {
        self.stats.report(provider, success, latency_ms);
    }

    /// Every configured provider, scored and sorted, with health attached.
    pub fn rank(&self) -> Vec<(RankedProvider, bool)> {
        let candidates = build_candidates(&self.stats, self.gateways.names());
        rank_providers(&candidates, &self.weights)
            .into_iter()
            .map(|r| {
                let up = self.health.is_up(&r.provider);
                (r, up)
            })
            .collect()
    }

    fn best_of(&self, candidates: &[&str]) -> Option<Decision> {
        let candidates = build_candidates(&self.stats, candidates.iter().copied());
        let best = pick_best(&candidates, &self.weights)?;
        let gateway = self.gateways.get(&best.provider)?;
        Some(Decision {
            reason: format!("score={:.3}", best.score),
            provider: best.provider,
            gateway,
        })
    }
}
