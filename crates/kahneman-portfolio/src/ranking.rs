//! Composite scores and decile ranks.

use crate::error::PortfolioError;
use kahneman_data::{Field, Observation, Panel, Period, SecurityId};
use kahneman_regression::CoefficientSummary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How often decile assignments are refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rebalance {
    /// Rank every period's cross-section
    #[default]
    #[serde(rename = "month", alias = "monthly")]
    Monthly,
    /// Rank the January cross-section and hold for the year
    #[serde(rename = "year", alias = "annual")]
    Annual,
}

/// Ranking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of equal-frequency buckets (default: 10)
    pub buckets: usize,
    /// |t| above which a feature enters the score (default: 1.5)
    pub significance_threshold: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            buckets: 10,
            significance_threshold: 1.5,
        }
    }
}

impl RankingConfig {
    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), PortfolioError> {
        if self.buckets < 2 {
            return Err(PortfolioError::InvalidConfig(format!(
                "buckets must be at least 2, got {}",
                self.buckets
            )));
        }
        if !(self.significance_threshold.is_finite() && self.significance_threshold >= 0.0) {
            return Err(PortfolioError::InvalidConfig(format!(
                "significance threshold must be non-negative, got {}",
                self.significance_threshold
            )));
        }
        Ok(())
    }

    /// Bucket holding the highest scores.
    pub const fn top_bucket(&self) -> usize {
        self.buckets.saturating_sub(1)
    }
}

/// An observation with its assigned bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedObservation {
    /// Security identifier
    pub security: SecurityId,
    /// Period of the observation
    pub period: Period,
    /// Composite score of this observation, if every feature was present
    pub score: Option<f64>,
    /// Bucket in `0..buckets`, ascending with score
    pub decile: usize,
    /// Next-period log return in percent
    pub next_return: Option<f64>,
}

/// Bucket label of a 1-based `rank` among `n` ranked items.
///
/// Edges are placed at `1 + k (n - 1) / buckets` for `k = 1..buckets`; the
/// label is the number of edges strictly below the rank. A lone item gets 0.
pub fn decile(rank: usize, n: usize, buckets: usize) -> usize {
    if n <= 1 || rank == 0 {
        return 0;
    }
    // rank > 1 + k (n - 1) / buckets, in integers
    let scaled = (rank - 1) * buckets;
    (1..buckets).filter(|&k| scaled > k * (n - 1)).count()
}

/// Scores observations by t-weighted features and assigns buckets.
#[derive(Debug, Clone)]
pub struct ScoreRanker {
    weights: Vec<(String, f64)>,
    config: RankingConfig,
}

impl ScoreRanker {
    /// Create a ranker from `(feature, weight)` pairs.
    pub fn new(weights: Vec<(String, f64)>, config: RankingConfig) -> Result<Self, PortfolioError> {
        config.validate()?;
        Ok(Self { weights, config })
    }

    /// Weight each feature by its t-statistic in `summary`.
    pub fn from_summary(
        summary: &CoefficientSummary,
        features: &[String],
        config: RankingConfig,
    ) -> Result<Self, PortfolioError> {
        let weights = features
            .iter()
            .map(|f| {
                summary
                    .t_stat(f)
                    .map(|t| (f.clone(), t))
                    .ok_or_else(|| PortfolioError::MissingWeight(f.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(weights, config)
    }

    /// Feature weights.
    pub fn weights(&self) -> &[(String, f64)] {
        &self.weights
    }

    /// Ranking parameters.
    pub const fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Composite score; `None` when any weighted feature is missing.
    pub fn score(&self, obs: &Observation, fields: &[Field]) -> Option<f64> {
        fields
            .iter()
            .zip(&self.weights)
            .map(|(&field, (_, weight))| obs.get(field).map(|v| v * weight))
            .sum()
    }

    /// Score and bucket a panel.
    ///
    /// Only observations that receive a bucket are returned, in storage order.
    pub fn rank(
        &self,
        panel: &Panel,
        rebalance: Rebalance,
    ) -> Result<Vec<RankedObservation>, PortfolioError> {
        let names: Vec<&str> = self.weights.iter().map(|(n, _)| n.as_str()).collect();
        let fields = panel.fields(&names)?;
        let scores: Vec<Option<f64>> = panel
            .observations()
            .iter()
            .map(|obs| self.score(obs, &fields))
            .collect();

        let buckets = match rebalance {
            Rebalance::Monthly => self.monthly_buckets(panel, &scores),
            Rebalance::Annual => self.annual_buckets(panel, &scores),
        };

        let ranked: Vec<RankedObservation> = panel
            .observations()
            .iter()
            .zip(scores)
            .zip(buckets)
            .filter_map(|((obs, score), bucket)| {
                bucket.map(|decile| RankedObservation {
                    security: obs.security,
                    period: obs.period,
                    score,
                    decile,
                    next_return: obs.next_return,
                })
            })
            .collect();

        tracing::debug!(
            observations = panel.len(),
            ranked = ranked.len(),
            ?rebalance,
            "ranked panel"
        );
        Ok(ranked)
    }

    /// Bucket of every observation, ranking each period separately.
    fn monthly_buckets(&self, panel: &Panel, scores: &[Option<f64>]) -> Vec<Option<usize>> {
        let mut groups: BTreeMap<Period, Vec<usize>> = BTreeMap::new();
        for (idx, obs) in panel.observations().iter().enumerate() {
            groups.entry(obs.period).or_default().push(idx);
        }

        let mut buckets = vec![None; scores.len()];
        for members in groups.values() {
            for (idx, bucket) in self.bucket_group(members, scores) {
                buckets[idx] = Some(bucket);
            }
        }
        buckets
    }

    /// Bucket of every observation, from the January ranking of its year.
    fn annual_buckets(&self, panel: &Panel, scores: &[Option<f64>]) -> Vec<Option<usize>> {
        let observations = panel.observations();
        let mut januaries: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (idx, obs) in observations.iter().enumerate() {
            if obs.month() == 1 {
                januaries.entry(obs.year()).or_default().push(idx);
            }
        }

        let mut held: HashMap<(i32, SecurityId), usize> = HashMap::new();
        for (&year, members) in &januaries {
            for (idx, bucket) in self.bucket_group(members, scores) {
                held.insert((year, observations[idx].security), bucket);
            }
        }

        observations
            .iter()
            .map(|obs| held.get(&(obs.year(), obs.security)).copied())
            .collect()
    }

    /// Rank the scored members of one group, ties in storage order.
    fn bucket_group(&self, members: &[usize], scores: &[Option<f64>]) -> Vec<(usize, usize)> {
        let mut scored: Vec<(usize, f64)> = members
            .iter()
            .filter_map(|&idx| scores[idx].filter(|s| !s.is_nan()).map(|s| (idx, s)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));

        let n = scored.len();
        scored
            .into_iter()
            .enumerate()
            .map(|(pos, (idx, _))| (idx, decile(pos + 1, n, self.config.buckets)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kahneman_data::PanelSchema;
    use rstest::rstest;

    fn obs(security: i64, yyyymm: i64, x: Option<f64>) -> Observation {
        Observation {
            security: SecurityId(security),
            period: Period::from_yyyymm(yyyymm).unwrap(),
            industry: Some("1".to_string()),
            ret: None,
            next_return: Some(security as f64),
            split: Some(0),
            features: vec![x],
        }
    }

    fn ranker() -> ScoreRanker {
        ScoreRanker::new(vec![("x".to_string(), 2.0)], RankingConfig::default()).unwrap()
    }

    fn panel(rows: Vec<Observation>) -> Panel {
        Panel::new(PanelSchema::default(), vec!["x".to_string()], rows).unwrap()
    }

    #[rstest]
    #[case(10)]
    #[case(11)]
    #[case(25)]
    #[case(37)]
    #[case(100)]
    #[case(253)]
    fn test_bucket_sizes_within_one(#[case] n: usize) {
        let mut sizes = vec![0usize; 10];
        let mut last = 0;
        for rank in 1..=n {
            let d = decile(rank, n, 10);
            assert!(d >= last, "labels must ascend with rank");
            last = d;
            sizes[d] += 1;
        }
        let min = sizes.iter().min().unwrap();
        let max = sizes.iter().max().unwrap();
        assert!(max - min <= 1, "sizes {sizes:?}");
    }

    #[rstest]
    #[case(1, 1, 0)]
    #[case(1, 10, 0)]
    #[case(10, 10, 9)]
    #[case(5, 10, 4)]
    #[case(2, 3, 4)]
    #[case(3, 3, 9)]
    fn test_decile_labels(#[case] rank: usize, #[case] n: usize, #[case] expected: usize) {
        assert_eq!(decile(rank, n, 10), expected);
    }

    #[test]
    fn test_score_missing_feature() {
        let ranker = ranker();
        assert_eq!(ranker.score(&obs(1, 200101, Some(1.5)), &[Field::Feature(0)]), Some(3.0));
        assert_eq!(ranker.score(&obs(1, 200101, None), &[Field::Feature(0)]), None);
    }

    #[test]
    fn test_monthly_ranking_per_period() {
        let mut rows = Vec::new();
        for s in 0..10 {
            rows.push(obs(s, 200101, Some(s as f64)));
            rows.push(obs(s, 200102, Some(-(s as f64))));
        }
        rows.push(obs(99, 200102, None));
        let ranked = ranker().rank(&panel(rows), Rebalance::Monthly).unwrap();

        assert_eq!(ranked.len(), 20);
        let find = |s: i64, p: i64| {
            ranked
                .iter()
                .find(|r| r.security == SecurityId(s) && r.period.yyyymm() == p)
                .map(|r| r.decile)
        };
        assert_eq!(find(9, 200101), Some(9));
        assert_eq!(find(9, 200102), Some(0));
        assert_eq!(find(0, 200102), Some(9));
        assert_eq!(find(99, 200102), None);
    }

    #[test]
    fn test_ties_break_by_storage_order() {
        let rows: Vec<Observation> = (0..10).map(|s| obs(s, 200101, Some(1.0))).collect();
        let ranked = ranker().rank(&panel(rows), Rebalance::Monthly).unwrap();
        let deciles: Vec<usize> = ranked.iter().map(|r| r.decile).collect();
        assert_eq!(deciles, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_annual_ranking_propagates_january() {
        let mut rows = Vec::new();
        for s in 0..10 {
            rows.push(obs(s, 200101, Some(s as f64)));
            // Later months reverse the score but keep the January bucket.
            rows.push(obs(s, 200105, Some(-(s as f64))));
            rows.push(obs(s, 200201, Some(s as f64)));
        }
        // No January row in 2001 for this security.
        rows.push(obs(42, 200103, Some(100.0)));
        let ranked = ranker().rank(&panel(rows), Rebalance::Annual).unwrap();

        let may: Vec<&RankedObservation> =
            ranked.iter().filter(|r| r.period.yyyymm() == 200105).collect();
        assert_eq!(may.len(), 10);
        for r in may {
            assert_eq!(r.decile as i64, r.security.0);
        }
        assert!(ranked.iter().all(|r| r.security != SecurityId(42)));
    }

    #[test]
    fn test_rebalance_serde_names() {
        assert_eq!(serde_json::to_string(&Rebalance::Annual).unwrap(), "\"year\"");
        let parsed: Rebalance = serde_json::from_str("\"month\"").unwrap();
        assert_eq!(parsed, Rebalance::Monthly);
    }

    #[test]
    fn test_invalid_buckets() {
        let config = RankingConfig {
            buckets: 1,
            ..Default::default()
        };
        assert!(ScoreRanker::new(vec![], config).is_err());
    }
}
