use dashmap::DashMap;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

pub const LATENCY_WINDOW: usize = 200;
pub const SEED_LATENCY_MS: f64 = 200.0;
const EWMA_KEEP: f64 = 0.8;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProviderStat {
    pub success_count: u64,
    pub fail_count: u64,
    pub avg_latency_ms: f64,
    #[serde(skip)]
    pub latencies: VecDeque<u64>,
}

impl Default for ProviderStat {
    fn default() -> Self {
        Self {
            success_count: 0,
            fail_count: 0,
            avg_latency_ms: SEED_LATENCY_MS,
            latencies: VecDeque::with_capacity(LATENCY_WINDOW),
        }
    }
}

impl ProviderStat {
    /// Never zero, so callers can divide by it.
    pub fn total(&self) -> u64 {
        (self.success_count + self.fail_count).max(1)
    }

    pub fn success_rate(&self) -> f64 {
        self.success_count as f64 / self.total() as f64
    }

    fn record(&mut self, success: bool, latency_ms: u64) {
        if success {
            self.success_count += 1;
        } else {
            self.fail_count += 1;
        }
        self.avg_latency_ms = EWMA_KEEP * self.avg_latency_ms + (1.0 - EWMA_KEEP) * latency_ms as f64;
        if self.latencies.len() == LATENCY_WINDOW {
            self.latencies.pop_front();
        }
        self.latencies.push_back(latency_ms);
    }
}

/// Rolling per-provider outcome stats. Writers for one provider serialise on
/// that provider's shard; different providers do not contend.
#[derive(Default)]
pub struct ProviderStatsRegistry {
    stats: DashMap<String, ProviderStat>,
}

impl ProviderStatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, name: &str, success: bool, latency_ms: u64) {
        self.stats
            .entry(name.to_lowercase())
            .or_default()
            .record(success, latency_ms);
    }

    pub fn get(&self, name: &str) -> ProviderStat {
        self.stats
            .get(&name.to_lowercase())
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, ProviderStat> {
        self.stats
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_provider_has_seed_latency_and_nonzero_total() {
        let reg = ProviderStatsRegistry::new();
        let s = reg.get("stripe");
        assert_eq!(s.total(), 1);
        assert_eq!(s.success_rate(), 0.0);
        assert_eq!(s.avg_latency_ms, SEED_LATENCY_MS);
    }

    #[test]
    fn ewma_moves_twenty_percent_toward_sample() {
        let reg = ProviderStatsRegistry::new();
        reg.report("stripe", true, 700);
        let s = reg.get("stripe");
        assert!((s.avg_latency_ms - 300.0).abs() < 1e-9);
        reg.report("stripe", false, 300);
        let s = reg.get("stripe");
        assert!((s.avg_latency_ms - 300.0).abs() < 1e-9);
        assert_eq!((s.success_count, s.fail_count), (1, 1));
    }

    #[test]
    fn latency_window_evicts_oldest() {
        let reg = ProviderStatsRegistry::new();
        for i in 0..(LATENCY_WINDOW as u64 + 5) {
            reg.report("mockpsp", true, i);
        }
        let s = reg.get("mockpsp");
        assert_eq!(s.latencies.len(), LATENCY_WINDOW);
        assert_eq!(s.latencies.front(), Some(&5));
        assert_eq!(s.latencies.back(), Some(&(LATENCY_WINDOW as u64 + 4)));
    }

    #[test]
    fn concurrent_reports_are_not_lost() {
        let reg = std::sync::Arc::new(ProviderStatsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let reg = reg.clone();
                std::thread::spawn(move || {
                    let name = if t % 2 == 0 { "stripe" } else { "mockpsp" };
                    for _ in 0..250 {
                        reg.report(name, true, 10);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(reg.get("stripe").success_count, 1000);
        assert_eq!(reg.get("mockpsp").success_count, 1000);
    }
}
