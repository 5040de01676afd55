//! Benchmark factor returns.
//!
//! Calendar-date indexed market excess return, size (SMB), value (HML) and
//! momentum factors used to risk-adjust long-short spreads.

use crate::error::{DataError, Result};
use crate::frame::{cast_column, f64_values, read_csv};
use crate::period::Period;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Column names of the benchmark factor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSchema {
    /// Date column (default: "date")
    pub date: String,
    /// Market excess return (default: "mkt_rf")
    pub market: String,
    /// Size factor (default: "SMB")
    pub size: String,
    /// Value factor (default: "HML")
    pub value: String,
    /// Momentum factor (default: "Mom")
    pub momentum: String,
}

impl Default for BenchmarkSchema {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            market: "mkt_rf".to_string(),
            size: "SMB".to_string(),
            value: "HML".to_string(),
            momentum: "Mom".to_string(),
        }
    }
}

/// Factor returns for one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    /// Market excess return
    pub market: Option<f64>,
    /// Small-minus-big
    pub size: Option<f64>,
    /// High-minus-low
    pub value: Option<f64>,
    /// Winners-minus-losers
    pub momentum: Option<f64>,
}

impl BenchmarkRow {
    /// All four factors, or `None` if any is missing.
    pub fn complete(&self) -> Option<[f64; 4]> {
        let row = [self.market?, self.size?, self.value?, self.momentum?];
        row.iter().all(|v| v.is_finite()).then_some(row)
    }
}

/// Date-indexed benchmark factor table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkFactors {
    rows: BTreeMap<NaiveDate, BenchmarkRow>,
}

impl BenchmarkFactors {
    /// Create a table from (date, row) pairs; later duplicates win.
    pub fn new(rows: impl IntoIterator<Item = (NaiveDate, BenchmarkRow)>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Factor row for a date.
    pub fn get(&self, date: &NaiveDate) -> Option<&BenchmarkRow> {
        self.rows.get(date)
    }

    /// Factor row for the first calendar day of a period.
    pub fn for_period(&self, period: Period) -> Option<&BenchmarkRow> {
        period.first_day().ok().and_then(|d| self.rows.get(&d))
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build from a `DataFrame`.
    ///
    /// The date column may be a polars `Date`, an ISO `YYYY-MM-DD` string, or
    /// an integer `yyyymm` (mapped to the first day of the month) or
    /// `yyyymmdd`.
    pub fn from_frame(df: &DataFrame, schema: &BenchmarkSchema) -> Result<Self> {
        let dates = parse_dates(df, &schema.date)?;
        let market = f64_values(df, &schema.market)?;
        let size = f64_values(df, &schema.size)?;
        let value = f64_values(df, &schema.value)?;
        let momentum = f64_values(df, &schema.momentum)?;

        let rows = dates.into_iter().enumerate().map(|(i, date)| {
            (
                date,
                BenchmarkRow {
                    market: market[i],
                    size: size[i],
                    value: value[i],
                    momentum: momentum[i],
                },
            )
        });
        let table = Self::new(rows);
        tracing::info!(dates = table.len(), "loaded benchmark factors");
        Ok(table)
    }

    /// Load from a CSV file.
    pub fn load_csv(path: &Path, schema: &BenchmarkSchema) -> Result<Self> {
        Self::from_frame(&read_csv(path)?, schema)
    }
}

fn parse_dates(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    let dtype = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?
        .dtype()
        .clone();

    match dtype {
        DataType::Date => {
            let days = cast_column(df, name, &DataType::Int32)?;
            days.i32()?
                .into_iter()
                .map(|d| {
                    d.and_then(|d| NaiveDate::from_num_days_from_ce_opt(d + EPOCH_DAYS_FROM_CE))
                        .ok_or_else(|| DataError::InvalidDate(format!("{d:?}")))
                })
                .collect()
        }
        DataType::String => {
            let strings = cast_column(df, name, &DataType::String)?;
            strings
                .str()?
                .into_iter()
                .map(|s| {
                    let s = s.ok_or_else(|| DataError::InvalidDate("null".to_string()))?;
                    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").or_else(|_| {
                        s.trim()
                            .parse::<i64>()
                            .map_err(|_| DataError::InvalidDate(s.to_string()))
                            .and_then(integer_date)
                    })
                })
                .collect()
        }
        _ => {
            let ints = cast_column(df, name, &DataType::Int64)?;
            ints.i64()?
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| DataError::InvalidDate("null".to_string()))
                        .and_then(integer_date)
                })
                .collect()
        }
    }
}

/// Days from 0001-01-01 to 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn integer_date(value: i64) -> Result<NaiveDate> {
    if value > 999_999 {
        let invalid = || DataError::InvalidDate(value.to_string());
        let year = i32::try_from(value / 10_000).map_err(|_| invalid())?;
        let month = ((value / 100) % 100) as u32;
        let day = (value % 100) as u32;
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    } else {
        Period::from_yyyymm(value)?.first_day()
    }
}
