//! Prospect Theory Factor
//!
//! Applies the rolling TK engine to a long-format return frame. The frame is
//! sorted by security and period, the value-transformed return is appended as
//! `V` and the rolling TK score as `TK`.

use crate::config::ProspectConfig;
use crate::error::ProspectError;
use crate::rolling::RollingTKEngine;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names read and written by [`ProspectTheoryFactor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectColumns {
    /// Security identifier (default: "permno")
    pub security: String,
    /// Period (default: "yyyymm")
    pub period: String,
    /// Raw return (default: "ret")
    pub ret: String,
    /// Output value column (default: "V")
    pub value: String,
    /// Output score column (default: "TK")
    pub score: String,
}

impl Default for ProspectColumns {
    fn default() -> Self {
        Self {
            security: "permno".to_string(),
            period: "yyyymm".to_string(),
            ret: "ret".to_string(),
            value: "V".to_string(),
            score: "TK".to_string(),
        }
    }
}

/// ProspectTheoryFactor computes the rolling TK score per security
#[derive(Debug, Default)]
pub struct ProspectTheoryFactor {
    config: ProspectConfig,
    columns: ProspectColumns,
}

impl ProspectTheoryFactor {
    /// Create a factor with the given parameters and default column names.
    pub fn with_config(config: ProspectConfig) -> Self {
        Self {
            config,
            columns: ProspectColumns::default(),
        }
    }

    /// Override the column names.
    pub fn with_columns(mut self, columns: ProspectColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Factor name.
    pub fn name(&self) -> &str {
        &self.columns.score
    }

    /// Parameters in use.
    pub const fn config(&self) -> &ProspectConfig {
        &self.config
    }

    /// Columns the input frame must provide.
    pub fn required_columns(&self) -> [&str; 3] {
        [
            self.columns.security.as_str(),
            self.columns.period.as_str(),
            self.columns.ret.as_str(),
        ]
    }

    /// Compute TK scores.
    ///
    /// Returns a frame with the security, period and return columns plus the
    /// value and score columns, sorted by security then period. Each call
    /// starts from an empty weight cache.
    pub fn compute_scores(&self, data: LazyFrame) -> Result<LazyFrame, ProspectError> {
        let mut engine = RollingTKEngine::new(&self.config)?;
        let [security, period, ret] = self.required_columns();

        let df = data
            .select([col(security), col(period), col(ret)])
            .sort([security, period], Default::default())
            .collect()?;

        let ids = column_values(&df, security, &DataType::Int64)?;
        let ids: Vec<i64> = ids
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, id)| id.ok_or(ProspectError::MissingSecurity(row)))
            .collect::<Result<_, _>>()?;
        let returns = column_values(&df, ret, &DataType::Float64)?;
        let returns: Vec<Option<f64>> = returns.f64()?.into_iter().collect();

        let mut values = Vec::with_capacity(returns.len());
        let mut scores = Vec::with_capacity(returns.len());
        let mut start = 0;
        while start < ids.len() {
            let end = start + ids[start..].iter().take_while(|&&id| id == ids[start]).count();
            let history = engine.value_transform().apply(&returns[start..end]);
            scores.extend(engine.scores_from_values(&history));
            values.extend(history);
            start = end;
        }

        tracing::info!(
            rows = df.height(),
            window = engine.window(),
            cached_weights = engine.cache().len(),
            "computed prospect theory scores"
        );

        let out = df.hstack(&[
            Column::new(self.columns.value.as_str().into(), values),
            Column::new(self.columns.score.as_str().into(), scores),
        ])?;
        Ok(out.lazy())
    }
}

fn column_values(df: &DataFrame, name: &str, dtype: &DataType) -> Result<Series, ProspectError> {
    let column = df
        .column(name)
        .map_err(|_| ProspectError::MissingColumn(name.to_string()))?;
    Ok(column.as_materialized_series().cast(dtype)?)
}
