//! Experiment configuration.

use crate::error::ExperimentError;
use kahneman_portfolio::{RankingConfig, Rebalance};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Months of the training split used in the regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrainFrequency {
    /// Every month
    #[default]
    #[serde(rename = "all")]
    All,
    /// January and July
    #[serde(rename = "6m")]
    SemiAnnual,
    /// January only
    #[serde(rename = "12m")]
    Annual,
}

impl TrainFrequency {
    /// Calendar months kept, or `None` for every month.
    pub const fn months(&self) -> Option<&'static [u32]> {
        match self {
            Self::All => None,
            Self::SemiAnnual => Some(&[1, 7]),
            Self::Annual => Some(&[1]),
        }
    }
}

fn default_yvar() -> String {
    "1m.lret".to_string()
}

/// One experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Name reported in the result row
    pub name: String,
    /// Candidate features for the cross-sectional regressions
    pub vars: Vec<String>,
    /// Regression target (default: "1m.lret")
    #[serde(default = "default_yvar")]
    pub yvar: String,
    /// Training month sampling (default: "all")
    #[serde(default)]
    pub train_freq: TrainFrequency,
    /// Portfolio rebalancing, "month" or "year" (default: "month")
    #[serde(default)]
    pub turnover: Rebalance,
    /// Ranking parameters
    #[serde(default)]
    pub ranking: RankingConfig,
}

impl ExperimentConfig {
    /// Create a configuration with default target, sampling and rebalancing.
    pub fn new(name: impl Into<String>, vars: Vec<String>) -> Self {
        Self {
            name: name.into(),
            vars,
            yvar: default_yvar(),
            train_freq: TrainFrequency::default(),
            turnover: Rebalance::default(),
            ranking: RankingConfig::default(),
        }
    }

    /// Set the training month sampling.
    pub fn with_train_freq(mut self, train_freq: TrainFrequency) -> Self {
        self.train_freq = train_freq;
        self
    }

    /// Set the rebalancing frequency.
    pub fn with_turnover(mut self, turnover: Rebalance) -> Self {
        self.turnover = turnover;
        self
    }

    /// Check that the configuration can be run.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        let invalid = |reason: &str| ExperimentError::InvalidConfig {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.vars.is_empty() {
            return Err(invalid("no features"));
        }
        if self.vars.iter().any(|v| v == &self.yvar) {
            return Err(invalid("target is also a feature"));
        }
        self.ranking.validate()?;
        Ok(())
    }

    /// Parse a JSON array of configurations.
    pub fn from_json(json: &str) -> Result<Vec<Self>, ExperimentError> {
        let configs: Vec<Self> = serde_json::from_str(json)?;
        for config in &configs {
            config.validate()?;
        }
        Ok(configs)
    }

    /// Load a JSON array of configurations from a file.
    pub fn load_json(path: &Path) -> Result<Vec<Self>, ExperimentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
