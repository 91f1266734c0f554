use payflow_router::scoring::engine::{pick_best, rank_providers, score_provider};
use payflow_router::scoring::types::{ProviderCandidate, ScoreInputs, ScoreWeights};
use proptest::prelude::*;

fn candidate(name: &str, success_rate: f64, avg_latency_ms: f64, cost_weight: f64) -> ProviderCandidate {
    ProviderCandidate {
        provider: name.to_string(),
        inputs: ScoreInputs {
            success_rate,
            avg_latency_ms,
            cost_weight,
        },
    }
}

#[test]
fn scoring_prefers_better_provider() {
    let weights = ScoreWeights::default();
    let top = candidate("stripe", 0.95, 150.0, 0.4);
    let low = candidate("mockpsp", 0.40, 900.0, 0.8);

    let ranked = rank_providers(&[low, top], &weights);
    assert_eq!(ranked[0].provider, "stripe");
    // 0.4*0.95 + 0.4*0.85 + 0.2*0.4
    assert!((ranked[0].score - 0.80).abs() < 1e-9);
}

#[test]
fn ties_go_to_the_earlier_candidate() {
    let weights = ScoreWeights::default();
    let a = candidate("stripe", 0.5, 300.0, 0.5);
    let b = candidate("mockpsp", 0.5, 300.0, 0.5);
    assert_eq!(pick_best(&[a, b], &weights).unwrap().provider, "stripe");
}

#[test]
fn cold_start_favours_the_cheaper_provider() {
    let weights = ScoreWeights::default();
    let stripe = candidate("stripe", 0.0, 200.0, 0.4);
    let mock = candidate("mockpsp", 0.0, 200.0, 0.8);
    let best = pick_best(&[stripe, mock], &weights).unwrap();
    assert_eq!(best.provider, "mockpsp");
    assert_eq!(format!("score={:.3}", best.score), "score=0.480");
}

proptest! {
    #[test]
    fn higher_success_rate_scores_strictly_higher(
        sr in 0.0f64..0.99,
        bump in 0.001f64..0.5,
        lat in 0.0f64..5000.0,
        cost in 0.0f64..1.0,
    ) {
        let weights = ScoreWeights::default();
        let hi = (sr + bump).min(1.0);
        prop_assume!(hi > sr);
        let base = score_provider(&candidate("p", sr, lat, cost), &weights);
        let better = score_provider(&candidate("p", hi, lat, cost), &weights);
        prop_assert!(better.score > base.score);
    }

    #[test]
    fn lower_latency_scores_strictly_higher_inside_the_scale(
        sr in 0.0f64..1.0,
        lat in 1.0f64..1000.0,
        cut in 0.5f64..500.0,
        cost in 0.0f64..1.0,
    ) {
        let weights = ScoreWeights::default();
        let faster = (lat - cut).max(0.0);
        prop_assume!(faster < lat);
        let base = score_provider(&candidate("p", sr, lat, cost), &weights);
        let better = score_provider(&candidate("p", sr, faster, cost), &weights);
        prop_assert!(better.score > base.score);
    }

    #[test]
    fn score_stays_in_unit_range(
        sr in 0.0f64..=1.0,
        lat in 0.0f64..10_000.0,
        cost in 0.0f64..=1.0,
    ) {
        let s = score_provider(&candidate("p", sr, lat, cost), &ScoreWeights::default()).score;
        prop_assert!((0.0..=1.0 + 1e-12).contains(&s));
    }
}
