//! Properties of the TK signal across the public API.

use approx::assert_relative_eq;
use kahneman_prospect::{ProbabilityWeighting, ProspectConfig, RollingTKEngine, WeightCache};
use rstest::rstest;

#[rstest]
#[case(35, 0)]
#[case(36, 1)]
#[case(40, 5)]
fn test_eligible_score_count(#[case] months: usize, #[case] eligible: usize) {
    let mut engine = RollingTKEngine::new(&ProspectConfig::default()).unwrap();
    let returns: Vec<Option<f64>> = (0..months)
        .map(|i| Some(((i * 7) % 11) as f64 - 5.0))
        .collect();
    let scores = engine.scores(&returns);

    let leading = months.saturating_sub(eligible);
    assert_eq!(scores.len(), months);
    assert!(scores[..leading].iter().all(|&s| s == 0.0));
    assert_eq!(scores[leading..].len(), eligible);
    assert!(scores[leading..].iter().all(|&s| s.is_finite() && s != 0.0));
}

#[test]
fn test_weights_ignore_window_content() {
    let config = ProspectConfig {
        window: 4,
        ..Default::default()
    };
    let mut engine = RollingTKEngine::new(&config).unwrap();

    // Two windows with the same (losses, gains) counts share one weight vector.
    engine.compute_tk(&[-1.0, 2.0, 3.0, -4.0]);
    engine.compute_tk(&[5.0, -0.1, -9.0, 0.0]);
    assert_eq!(engine.cache().len(), 1);
    assert_eq!(engine.cache().hits(), 1);
}

#[test]
fn test_all_gains_window_is_weighted_sum() {
    let config = ProspectConfig {
        window: 3,
        ..Default::default()
    };
    let mut engine = RollingTKEngine::new(&config).unwrap();
    let values = [1.0, 1.0, 1.0];
    let tk = engine.compute_tk(&values);

    // Gain weights telescope to w(1, gamma) = 1.
    assert_relative_eq!(tk, 1.0, epsilon = 1e-12);
}

#[test]
fn test_cache_round_trip_bit_identical() {
    let mut cache = WeightCache::new(ProbabilityWeighting::default(), 16);
    let a = cache.get(10, 26);
    let b = cache.get(10, 26);
    assert_eq!(a.len(), 36);
    assert!(a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits()));
}
