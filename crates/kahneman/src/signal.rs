//! TK signal stage.

use crate::error::ExperimentError;
use kahneman_data::Panel;
use kahneman_prospect::{ProspectConfig, RollingTKEngine};

/// Feature name of the prospect theory score.
pub const TK_FEATURE: &str = "TK";

/// Append the rolling TK score of every observation as the [`TK_FEATURE`]
/// feature.
///
/// Each security's raw returns are taken in period order, missing returns
/// counting as zero. Securities with fewer than `window` periods score zero
/// throughout. One engine, and so one weight cache, serves the whole panel.
pub fn attach_prospect_signal(
    panel: Panel,
    config: &ProspectConfig,
) -> Result<Panel, ExperimentError> {
    let mut engine = RollingTKEngine::new(config)?;
    let mut scores = vec![None; panel.len()];

    let histories = panel.security_histories();
    for indices in histories.values() {
        let returns: Vec<Option<f64>> = indices
            .iter()
            .map(|&i| panel.observations()[i].ret)
            .collect();
        for (&i, score) in indices.iter().zip(engine.scores(&returns)) {
            scores[i] = Some(score);
        }
    }

    tracing::info!(
        securities = histories.len(),
        observations = panel.len(),
        window = engine.window(),
        cached_weights = engine.cache().len(),
        cache_hits = engine.cache().hits(),
        "attached prospect theory signal"
    );

    Ok(panel.with_feature(TK_FEATURE, scores)?)
}
