//! Ranking through evaluation on a synthetic panel.

use approx::assert_relative_eq;
use kahneman_data::{
    BenchmarkFactors, BenchmarkRow, Observation, Panel, PanelSchema, Period, SecurityId,
};
use kahneman_portfolio::{
    PerformanceEvaluator, PortfolioBuilder, RankingConfig, Rebalance, ScoreRanker,
};
use rstest::rstest;

/// 30 securities over 24 months; the next return rises with the signal.
fn panel() -> Panel {
    let mut observations = Vec::new();
    let mut period = Period::from_yyyymm(200001).unwrap();
    for t in 0..24i64 {
        for s in 0..30i64 {
            let signal = ((s * 11 + t * 5) % 30) as f64;
            observations.push(Observation {
                security: SecurityId(s),
                period,
                industry: Some("all".to_string()),
                ret: None,
                next_return: Some(0.1 * signal - 1.0 + 0.05 * (t % 4) as f64),
                split: Some(0),
                features: vec![Some(signal)],
            });
        }
        period = period.next();
    }
    Panel::new(PanelSchema::default(), vec!["signal".to_string()], observations).unwrap()
}

fn benchmark() -> BenchmarkFactors {
    let mut period = Period::from_yyyymm(200001).unwrap();
    let mut rows = Vec::new();
    for t in 0..24 {
        let t = f64::from(t);
        rows.push((
            period.first_day().unwrap(),
            BenchmarkRow {
                market: Some((t * 0.9).sin()),
                size: Some((t * 0.3).cos()),
                value: Some((t * 1.7).sin()),
                momentum: Some((t * 0.5).cos() * 0.5),
            },
        ));
        period = period.next();
    }
    BenchmarkFactors::new(rows)
}

#[rstest]
#[case(Rebalance::Monthly, 24)]
#[case(Rebalance::Annual, 24)]
fn test_positive_signal_gives_positive_spread(
    #[case] rebalance: Rebalance,
    #[case] periods: usize,
) {
    let panel = panel();
    let ranker =
        ScoreRanker::new(vec![("signal".to_string(), 2.0)], RankingConfig::default()).unwrap();
    let ranked = ranker.rank(&panel, rebalance).unwrap();
    let returns = PortfolioBuilder::default().build(&ranked);
    assert_eq!(returns.len(), periods);

    let performance = PerformanceEvaluator::new(&benchmark()).evaluate(&returns);
    assert!(performance.long.mean > performance.short.mean);
    assert_eq!(performance.spread.count, periods);
    let carhart = performance.carhart.unwrap();
    assert_eq!(carhart.nobs, periods);

    if rebalance == Rebalance::Monthly {
        // Deciles hold 3 securities with signals {27,28,29} and {0,1,2}.
        for r in &returns {
            assert_relative_eq!(r.spread.unwrap(), 2.7, epsilon = 1e-10);
        }
        assert!(carhart.alpha > 2.0);
    }
}
