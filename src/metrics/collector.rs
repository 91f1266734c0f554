use crate::metrics::event::ErrorTag;
use crate::metrics::window::{p95, percentile};
use crate::registry::stats::ProviderStatsRegistry;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetrics {
    pub provider: String,
    pub success_count: u64,
    pub fail_count: u64,
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub success_rate: f64,
    pub p95_latency_ms: u64,
    pub failover_count: u64,
    pub error_distribution: BTreeMap<String, u64>,
    pub providers: Vec<ProviderMetrics>,
}

/// Process-wide counters. Provider-level numbers are derived from the stats
/// registry at snapshot time.
#[derive(Default)]
pub struct MetricsCollector {
    failovers: AtomicU64,
    errors: DashMap<ErrorTag, u64>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_failover(&self) {
        self.failovers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, tag: ErrorTag) {
        tracing::debug!(%tag, "error recorded");
        *self.errors.entry(tag).or_insert(0) += 1;
    }

    pub fn failover_count(&self) -> u64 {
        self.failovers.load(Ordering::Relaxed)
    }

    pub fn error_count(&self, tag: ErrorTag) -> u64 {
        self.errors.get(&tag).map(|c| *c).unwrap_or(0)
    }

    pub fn snapshot(&self, stats: &ProviderStatsRegistry) -> MetricsSnapshot {
        let per_provider = stats.snapshot();

        let (success, fail) = per_provider
            .values()
            .fold((0u64, 0u64), |(s, f), st| (s + st.success_count, f + st.fail_count));
        let success_rate = success as f64 / (success + fail).max(1) as f64;

        let windows: Vec<Vec<u64>> = per_provider
            .values()
            .map(|st| st.latencies.iter().copied().collect())
            .collect();
        let p95_latency_ms = p95(windows.iter().map(|w| w.as_slice()));

        let providers = per_provider
            .iter()
            .map(|(name, st)| {
                let mut sorted: Vec<u64> = st.latencies.iter().copied().collect();
                sorted.sort_unstable();
                ProviderMetrics {
                    provider: name.clone(),
                    success_count: st.success_count,
                    fail_count: st.fail_count,
                    success_rate: st.success_rate(),
                    avg_latency_ms: st.avg_latency_ms,
                    p95_latency_ms: percentile(&sorted, 0.95),
                }
            })
            .collect();

        let error_distribution = self
            .errors
            .iter()
            .map(|e| (e.key().as_str().to_string(), *e.value()))
            .collect();

        MetricsSnapshot {
            success_rate,
            p95_latency_ms,
            failover_count: self.failover_count(),
            error_distribution,
            providers,
        }
    }
}
