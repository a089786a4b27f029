//! Keyword partitioning.
//!
//! Splits a normalized [`Dataset`] into one ordered `(date, value)` series
//! per distinct keyword. No gap-filling or resampling is performed; missing
//! calendar dates are simply absent from a series.

use crate::dataset::Dataset;
use chrono::NaiveDate;
use std::collections::HashMap;

/// The ordered observations for a single keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSeries {
    keyword: String,
    points: Vec<(NaiveDate, f64)>,
}

impl KeywordSeries {
    /// Build a series from raw points, preserving their order.
    pub fn new(keyword: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            keyword: keyword.into(),
            points,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Number of observations in the series.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(date, value)` pairs in upload order.
    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|(d, _)| *d)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    /// Last (most recent) date in the series, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).max()
    }
}

/// Mapping of keyword to its series, keyword order of first appearance
/// preserved for display purposes.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    order: Vec<String>,
    series: HashMap<String, KeywordSeries>,
}

impl Partition {
    /// Partition a dataset into per-keyword series.
    ///
    /// Deterministic: the distinct keywords are exactly those present in the
    /// table. An empty table produces an empty partition.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut order = Vec::new();
        let mut series: HashMap<String, KeywordSeries> = HashMap::new();

        for obs in dataset.observations() {
            let entry = series.entry(obs.keyword.clone()).or_insert_with(|| {
                order.push(obs.keyword.clone());
                KeywordSeries::new(obs.keyword.clone(), Vec::new())
            });
            entry.points.push((obs.date, obs.value));
        }

        Self { order, series }
    }

    /// Number of distinct keywords.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keywords in order of first appearance.
    pub fn keywords(&self) -> &[String] {
        &self.order
    }

    /// Look up the series for a keyword.
    pub fn get(&self, keyword: &str) -> Option<&KeywordSeries> {
        self.series.get(keyword)
    }

    /// Iterate series in keyword first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &KeywordSeries> {
        self.order.iter().filter_map(|k| self.series.get(k))
    }
}
