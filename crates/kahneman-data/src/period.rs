//! Year-month periods.
//!
//! Panels index time by `yyyymm` integers (e.g. `200101` for January 2001).
//! [`Period`] validates the month and orders chronologically.

use crate::error::{DataError, Result};
use chrono::{Datelike, NaiveDate};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A calendar month.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display("{year:04}{month:02}")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period, validating the month.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(DataError::InvalidPeriod(i64::from(year) * 100 + i64::from(month)));
        }
        Ok(Self { year, month })
    }

    /// Parse a `yyyymm` integer.
    pub fn from_yyyymm(value: i64) -> Result<Self> {
        let year = i32::try_from(value / 100).map_err(|_| DataError::InvalidPeriod(value))?;
        let month = u32::try_from(value % 100).map_err(|_| DataError::InvalidPeriod(value))?;
        Self::new(year, month).map_err(|_| DataError::InvalidPeriod(value))
    }

    /// The `yyyymm` integer for this period.
    pub fn yyyymm(&self) -> i64 {
        i64::from(self.year) * 100 + i64::from(self.month)
    }

    /// Calendar year.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month (1-12).
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| DataError::InvalidDate(self.to_string()))
    }

    /// The period containing a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following month.
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200101, 2001, 1)]
    #[case(199912, 1999, 12)]
    #[case(202307, 2023, 7)]
    fn test_from_yyyymm(#[case] raw: i64, #[case] year: i32, #[case] month: u32) {
        let period = Period::from_yyyymm(raw).unwrap();
        assert_eq!(period.year(), year);
        assert_eq!(period.month(), month);
        assert_eq!(period.yyyymm(), raw);
    }

    #[rstest]
    #[case(200100)]
    #[case(200113)]
    #[case(-5)]
    fn test_invalid_period(#[case] raw: i64) {
        assert!(Period::from_yyyymm(raw).is_err());
    }

    #[test]
    fn test_display_and_ordering() {
        let a = Period::from_yyyymm(200112).unwrap();
        let b = Period::from_yyyymm(200201).unwrap();
        assert!(a < b);
        assert_eq!(a.to_string(), "200112");
        assert_eq!(a.next(), b);
    }

    #[test]
    fn test_first_day() {
        let period = Period::from_yyyymm(200407).unwrap();
        assert_eq!(
            period.first_day().unwrap(),
            NaiveDate::from_ymd_opt(2004, 7, 1).unwrap()
        );
        assert_eq!(Period::from_date(period.first_day().unwrap()), period);
    }
}
