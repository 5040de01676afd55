//! Polars ingestion.
//!
//! Converts polars `DataFrame`s into [`Panel`]s and reads CSV files. Every
//! column that is not claimed by the [`PanelSchema`] becomes a feature.

use crate::error::{DataError, Result};
use crate::panel::{Observation, Panel, PanelSchema, SecurityId};
use crate::period::Period;
use polars::prelude::*;
use std::path::Path;

/// Read a CSV file with a header row into a `DataFrame`.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    tracing::debug!(path = %path.display(), rows = df.height(), "read csv");
    Ok(df)
}

/// Fetch a column cast to `dtype`, mapping absence to [`DataError::MissingColumn`].
pub(crate) fn cast_column(df: &DataFrame, name: &str, dtype: &DataType) -> Result<Series> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    Ok(column.as_materialized_series().cast(dtype)?)
}

pub(crate) fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = cast_column(df, name, &DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = cast_column(df, name, &DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = cast_column(df, name, &DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Calendar columns that duplicate the period and are not read as features.
const CALENDAR_COLUMNS: [&str; 2] = ["year", "month"];

impl Panel {
    /// Build a panel from a `DataFrame`.
    ///
    /// The security, period and return columns are required. Industry,
    /// next-period return and split flag may be absent, in which case they
    /// are treated as missing for every row. Rows with a missing security or
    /// period are rejected. Every other column except `year` and `month`
    /// becomes a feature.
    pub fn from_frame(df: &DataFrame, schema: PanelSchema) -> Result<Self> {
        let height = df.height();
        let optional_f64 = |name: &str| -> Result<Vec<Option<f64>>> {
            if df.column(name).is_ok() {
                f64_values(df, name)
            } else {
                Ok(vec![None; height])
            }
        };

        let securities = i64_values(df, &schema.security)?;
        let periods = i64_values(df, &schema.period)?;
        let returns = f64_values(df, &schema.ret)?;
        let next_returns = optional_f64(&schema.next_return)?;
        let industries = if df.column(&schema.industry).is_ok() {
            string_values(df, &schema.industry)?
        } else {
            vec![None; height]
        };
        let splits = if df.column(&schema.split).is_ok() {
            i64_values(df, &schema.split)?
        } else {
            vec![None; height]
        };

        let feature_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| !schema.contains(name) && !CALENDAR_COLUMNS.contains(&name.as_str()))
            .collect();
        let feature_columns = feature_names
            .iter()
            .map(|name| f64_values(df, name))
            .collect::<Result<Vec<_>>>()?;

        let mut observations = Vec::with_capacity(height);
        for row in 0..height {
            let security = securities[row].ok_or_else(|| DataError::MissingKey {
                column: schema.security.clone(),
                row,
            })?;
            let period = periods[row].ok_or_else(|| DataError::MissingKey {
                column: schema.period.clone(),
                row,
            })?;
            observations.push(Observation {
                security: SecurityId(security),
                period: Period::from_yyyymm(period)?,
                industry: industries[row].clone(),
                ret: returns[row],
                next_return: next_returns[row],
                split: splits[row],
                features: feature_columns.iter().map(|c| c[row]).collect(),
            });
        }

        tracing::info!(
            observations = observations.len(),
            features = feature_names.len(),
            "loaded panel"
        );
        Self::new(schema, feature_names, observations)
    }

    /// Load a panel from a CSV file.
    pub fn load_csv(path: &Path, schema: PanelSchema) -> Result<Self> {
        Self::from_frame(&read_csv(path)?, schema)
    }
}
