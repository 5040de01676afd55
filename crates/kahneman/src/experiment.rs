//! Experiment runner
//!
//! One experiment takes a panel through the full back-test:
//!
//! 1. Drop duplicate (period, security) rows and rows without a target.
//! 2. Split into train (`s = 0`) and test (`s = 1`); sample training months.
//! 3. Keep training rows with a target and every feature.
//! 4. Fama-MacBeth on the training rows; keep features with |t| above the
//!    threshold.
//! 5. Score both splits with the t-statistics as weights, rank into deciles,
//!    and form long-short portfolios.
//! 6. Evaluate each portfolio series and emit one result row.

use crate::config::ExperimentConfig;
use crate::error::ExperimentError;
use kahneman_data::{BenchmarkFactors, Field, Panel};
use kahneman_output::{ExperimentSummary, SplitPerformance};
use kahneman_portfolio::{PerformanceEvaluator, PortfolioBuilder, ScoreRanker};
use kahneman_regression::{CoefficientSummarizer, CrossSectionalRegressor};
use std::fmt;

/// Split flag of training observations.
pub const TRAIN_SPLIT: i64 = 0;

/// Split flag of test observations.
pub const TEST_SPLIT: i64 = 1;

/// Progress notification from [`ExperimentRunner`].
#[derive(Debug, Clone, Copy)]
pub enum ExperimentEvent<'a> {
    /// A configuration is about to run
    Started {
        /// Position in the batch, from 0
        index: usize,
        /// Batch size
        total: usize,
        /// Configuration name
        name: &'a str,
    },
    /// A configuration produced its result row
    Finished {
        /// Position in the batch, from 0
        index: usize,
        /// Batch size
        total: usize,
        /// The result row
        summary: &'a ExperimentSummary,
    },
    /// A configuration failed; the batch continues
    Failed {
        /// Position in the batch, from 0
        index: usize,
        /// Batch size
        total: usize,
        /// Configuration name
        name: &'a str,
        /// Why it failed
        error: &'a ExperimentError,
    },
}

/// A configuration that produced no result row.
#[derive(Debug)]
pub struct FailedExperiment {
    /// Configuration name
    pub name: String,
    /// Why it failed
    pub error: ExperimentError,
}

/// Outcome of a batch: result rows in configuration order plus failures.
#[derive(Debug, Default)]
pub struct ExperimentBatch {
    /// Rows of the configurations that ran to completion
    pub rows: Vec<ExperimentSummary>,
    /// Configurations that failed
    pub failures: Vec<FailedExperiment>,
}

impl ExperimentBatch {
    /// Whether every configuration produced a row.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

type Observer<'a> = Box<dyn FnMut(ExperimentEvent<'_>) + 'a>;

/// Runs experiment configurations against one panel and benchmark table.
pub struct ExperimentRunner<'a> {
    panel: &'a Panel,
    factors: &'a BenchmarkFactors,
    observer: Option<Observer<'a>>,
}

impl fmt::Debug for ExperimentRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentRunner")
            .field("observations", &self.panel.len())
            .field("benchmark_dates", &self.factors.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl<'a> ExperimentRunner<'a> {
    /// Create a runner.
    pub const fn new(panel: &'a Panel, factors: &'a BenchmarkFactors) -> Self {
        Self {
            panel,
            factors,
            observer: None,
        }
    }

    /// Receive an [`ExperimentEvent`] before and after each configuration.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(ExperimentEvent<'_>) + 'a,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Run configurations one after another.
    ///
    /// A failing configuration is logged and recorded in
    /// [`ExperimentBatch::failures`]; the remaining ones still run.
    pub fn run_all(&mut self, configs: &[ExperimentConfig]) -> ExperimentBatch {
        let total = configs.len();
        let mut batch = ExperimentBatch {
            rows: Vec::with_capacity(total),
            failures: Vec::new(),
        };
        for (index, config) in configs.iter().enumerate() {
            self.notify(ExperimentEvent::Started {
                index,
                total,
                name: &config.name,
            });
            match self.run(config) {
                Ok(summary) => {
                    self.notify(ExperimentEvent::Finished {
                        index,
                        total,
                        summary: &summary,
                    });
                    batch.rows.push(summary);
                }
                Err(error) => {
                    tracing::warn!(name = %config.name, error = %error, "experiment failed");
                    self.notify(ExperimentEvent::Failed {
                        index,
                        total,
                        name: &config.name,
                        error: &error,
                    });
                    batch.failures.push(FailedExperiment {
                        name: config.name.clone(),
                        error,
                    });
                }
            }
        }
        batch
    }

    /// Run one configuration.
    pub fn run(&self, config: &ExperimentConfig) -> Result<ExperimentSummary, ExperimentError> {
        config.validate()?;
        tracing::info!(
            name = %config.name,
            vars = ?config.vars,
            train_freq = ?config.train_freq,
            turnover = ?config.turnover,
            "running experiment"
        );

        let target = self.panel.field(&config.yvar)?;
        let features = self.panel.fields(&config.vars)?;
        let (train, test) = self.prepare(config, target, &features)?;

        let fit =
            CrossSectionalRegressor::new(config.yvar.clone(), config.vars.clone()).fit(&train)?;
        let summary = CoefficientSummarizer::summarize(&fit);
        drop(fit);

        let significant = summary.significant_features(config.ranking.significance_threshold);
        if summary.is_empty() || significant.is_empty() {
            return Err(ExperimentError::NoSignificantFeatures {
                name: config.name.clone(),
            });
        }
        tracing::info!(name = %config.name, significant = ?significant, "selected features");

        let ranker = ScoreRanker::from_summary(&summary, &significant, config.ranking.clone())?;
        let builder = PortfolioBuilder::from_config(&config.ranking)?;
        let train_returns = builder.build(&ranker.rank(&train, config.turnover)?);
        drop(train);
        let test_returns = builder.build(&ranker.rank(&test, config.turnover)?);
        drop(test);

        let evaluator = PerformanceEvaluator::new(self.factors);
        let performance = SplitPerformance {
            train: evaluator.evaluate(&train_returns),
            valid: evaluator.evaluate(&test_returns),
        };

        let row = ExperimentSummary::new(config.name.clone(), significant.len(), &performance);
        tracing::info!(
            name = %row.name,
            train_alpha = row.train_alpha,
            valid_alpha = row.valid_alpha,
            "experiment complete"
        );
        Ok(row)
    }

    /// Train and test panels of a configuration.
    fn prepare(
        &self,
        config: &ExperimentConfig,
        target: Field,
        features: &[Field],
    ) -> Result<(Panel, Panel), ExperimentError> {
        let prepared = self.panel.deduplicate().drop_missing(target);

        let mut train = prepared.split(TRAIN_SPLIT);
        if let Some(months) = config.train_freq.months() {
            train = train.filter_months(months);
        }
        let required: Vec<Field> =
            std::iter::once(target).chain(features.iter().copied()).collect();
        let train = train.complete_cases(&required);
        let test = prepared.split(TEST_SPLIT);

        let empty = |split| ExperimentError::EmptySplit {
            name: config.name.clone(),
            split,
        };
        if train.is_empty() {
            return Err(empty("train"));
        }
        if test.is_empty() {
            return Err(empty("test"));
        }

        tracing::debug!(
            name = %config.name,
            train = train.len(),
            test = test.len(),
            "prepared splits"
        );
        Ok((train, test))
    }

    fn notify(&mut self, event: ExperimentEvent<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }
}
