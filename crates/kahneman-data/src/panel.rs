//! Security-period panel.
//!
//! A [`Panel`] holds one [`Observation`] per (security, period) together with
//! the names of its predictor features. Every transform consumes or borrows a
//! panel and returns a new one; no stage mutates data another stage holds.

use crate::error::{DataError, Result};
use crate::period::Period;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Security identifier (e.g. a CRSP PERMNO).
#[derive(
    Debug,
    Display,
    From,
    Into,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub struct SecurityId(pub i64);

/// Column names of the input panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSchema {
    /// Security identifier column (default: "permno")
    pub security: String,
    /// Period column holding `yyyymm` integers (default: "yyyymm")
    pub period: String,
    /// Raw return column (default: "ret")
    pub ret: String,
    /// Industry classification column (default: "ind")
    pub industry: String,
    /// Next-period log return in percent (default: "1m.lret")
    pub next_return: String,
    /// Train/test split flag, 0 for train and 1 for test (default: "s")
    pub split: String,
}

impl Default for PanelSchema {
    fn default() -> Self {
        Self {
            security: "permno".to_string(),
            period: "yyyymm".to_string(),
            ret: "ret".to_string(),
            industry: "ind".to_string(),
            next_return: "1m.lret".to_string(),
            split: "s".to_string(),
        }
    }
}

impl PanelSchema {
    /// All column names claimed by the schema.
    pub fn columns(&self) -> [&str; 6] {
        [
            self.security.as_str(),
            self.period.as_str(),
            self.ret.as_str(),
            self.industry.as_str(),
            self.next_return.as_str(),
            self.split.as_str(),
        ]
    }

    /// Whether `name` is one of the schema columns.
    pub fn contains(&self, name: &str) -> bool {
        self.columns().contains(&name)
    }
}

/// A resolved numeric column of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Raw return
    Return,
    /// Next-period return
    NextReturn,
    /// Predictor feature by index into [`Panel::feature_names`]
    Feature(usize),
}

/// One security in one period.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Security identifier
    pub security: SecurityId,
    /// Period of the observation
    pub period: Period,
    /// Industry classification label
    pub industry: Option<String>,
    /// Raw return
    pub ret: Option<f64>,
    /// Next-period log return in percent
    pub next_return: Option<f64>,
    /// Train/test split flag
    pub split: Option<i64>,
    /// Feature values, aligned with [`Panel::feature_names`]
    pub features: Vec<Option<f64>>,
}

impl Observation {
    /// Value of a resolved field; NaN is reported as missing.
    pub fn get(&self, field: Field) -> Option<f64> {
        let value = match field {
            Field::Return => self.ret,
            Field::NextReturn => self.next_return,
            Field::Feature(idx) => self.features.get(idx).copied().flatten(),
        };
        value.filter(|v| !v.is_nan())
    }

    /// Calendar year of the observation.
    pub const fn year(&self) -> i32 {
        self.period.year()
    }

    /// Calendar month of the observation.
    pub const fn month(&self) -> u32 {
        self.period.month()
    }
}

/// Immutable security-period panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    schema: PanelSchema,
    feature_names: Vec<String>,
    observations: Vec<Observation>,
}

impl Panel {
    /// Create a panel, checking that every observation carries all features.
    pub fn new(
        schema: PanelSchema,
        feature_names: Vec<String>,
        observations: Vec<Observation>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &feature_names {
            if !seen.insert(name.as_str()) || schema.contains(name) {
                return Err(DataError::DuplicateFeature(name.clone()));
            }
        }
        if let Some(bad) = observations
            .iter()
            .find(|o| o.features.len() != feature_names.len())
        {
            return Err(DataError::LengthMismatch {
                expected: feature_names.len(),
                actual: bad.features.len(),
            });
        }
        Ok(Self {
            schema,
            feature_names,
            observations,
        })
    }

    fn derive(&self, observations: Vec<Observation>) -> Self {
        Self {
            schema: self.schema.clone(),
            feature_names: self.feature_names.clone(),
            observations,
        }
    }

    /// Column names this panel was built with.
    pub const fn schema(&self) -> &PanelSchema {
        &self.schema
    }

    /// Predictor feature names.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// All observations in storage order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the panel has no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Resolve a column name to a [`Field`].
    ///
    /// Accepts the schema's return and next-return columns or any feature.
    pub fn field(&self, name: &str) -> Result<Field> {
        if name == self.schema.ret {
            return Ok(Field::Return);
        }
        if name == self.schema.next_return {
            return Ok(Field::NextReturn);
        }
        self.feature_names
            .iter()
            .position(|f| f == name)
            .map(Field::Feature)
            .ok_or_else(|| DataError::UnknownField(name.to_string()))
    }

    /// Resolve several column names at once.
    pub fn fields<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Field>> {
        names.iter().map(|n| self.field(n.as_ref())).collect()
    }

    /// Keep the first observation of every (period, security) pair.
    pub fn deduplicate(&self) -> Self {
        let mut seen = HashSet::new();
        let kept = self
            .observations
            .iter()
            .filter(|o| seen.insert((o.period, o.security)))
            .cloned()
            .collect();
        self.derive(kept)
    }

    /// Drop observations where `field` is missing.
    pub fn drop_missing(&self, field: Field) -> Self {
        self.filter(|o| o.get(field).is_some())
    }

    /// Keep observations where every field in `fields` is present.
    pub fn complete_cases(&self, fields: &[Field]) -> Self {
        self.filter(|o| fields.iter().all(|&f| o.get(f).is_some()))
    }

    /// Observations carrying the given split flag.
    pub fn split(&self, flag: i64) -> Self {
        self.filter(|o| o.split == Some(flag))
    }

    /// Observations whose calendar month is in `months`.
    pub fn filter_months(&self, months: &[u32]) -> Self {
        self.filter(|o| months.contains(&o.month()))
    }

    /// Observations matching a predicate.
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&Observation) -> bool,
    {
        let kept = self
            .observations
            .iter()
            .filter(|o| predicate(o))
            .cloned()
            .collect();
        self.derive(kept)
    }

    /// Append a feature column, one value per observation in storage order.
    pub fn with_feature(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self> {
        let name = name.into();
        if self.feature_names.contains(&name) || self.schema.contains(&name) {
            return Err(DataError::DuplicateFeature(name));
        }
        if values.len() != self.observations.len() {
            return Err(DataError::LengthMismatch {
                expected: self.observations.len(),
                actual: values.len(),
            });
        }
        for (obs, value) in self.observations.iter_mut().zip(values) {
            obs.features.push(value);
        }
        self.feature_names.push(name);
        Ok(self)
    }

    /// Distinct periods in ascending order.
    pub fn periods(&self) -> Vec<Period> {
        let mut periods: Vec<Period> = self.observations.iter().map(|o| o.period).collect();
        periods.sort_unstable();
        periods.dedup();
        periods
    }

    /// Observations grouped by period, in storage order within each period.
    pub fn cross_sections(&self) -> BTreeMap<Period, Vec<&Observation>> {
        let mut groups: BTreeMap<Period, Vec<&Observation>> = BTreeMap::new();
        for obs in &self.observations {
            groups.entry(obs.period).or_default().push(obs);
        }
        groups
    }

    /// Observation indices grouped by security, each sorted by period.
    pub fn security_histories(&self) -> BTreeMap<SecurityId, Vec<usize>> {
        let mut groups: BTreeMap<SecurityId, Vec<usize>> = BTreeMap::new();
        for (idx, obs) in self.observations.iter().enumerate() {
            groups.entry(obs.security).or_default().push(idx);
        }
        for indices in groups.values_mut() {
            indices.sort_by_key(|&i| self.observations[i].period);
        }
        groups
    }
}
