//! Dataset loading and normalization.
//!
//! Turns an uploaded CSV of `(date, keyword, value)` rows into a normalized
//! in-memory table: required columns resolved by header name, calendar dates
//! parsed strictly, and duplicate `(date, keyword)` rows dropped.

use crate::error::{Result, TrendcastError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Required column names in the uploaded file.
pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "keyword", "value"];

/// Date formats accepted for the `date` column, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// A single observation from the uploaded file. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub keyword: String,
    pub value: f64,
}

/// Normalized table of observations, unique on `(date, keyword)`.
///
/// Deduplication keeps the first occurrence in upload order and silently
/// drops later rows, even when their `value` differs. Conflicting duplicates
/// are therefore not detected; the first-seen row wins.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    /// Load a dataset from any byte source producing CSV.
    ///
    /// Fails when the stream is not parseable as CSV, when any of the
    /// required columns `date`, `keyword`, `value` is absent, or when any
    /// date or value cell fails parsing. A parse failure anywhere is fatal
    /// to the whole load; no partial table is produced.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.is_empty() {
            return Err(TrendcastError::EmptyUpload);
        }

        let column_index = |name: &'static str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(TrendcastError::MissingColumn { column: name })
        };

        // Columns are located by name; order and extra columns are ignored.
        let date_idx = column_index("date")?;
        let keyword_idx = column_index("keyword")?;
        let value_idx = column_index("value")?;

        let mut observations = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;

            let date_cell = record.get(date_idx).unwrap_or("").trim();
            let date = parse_date(date_cell).ok_or_else(|| TrendcastError::InvalidDate {
                row,
                value: date_cell.to_string(),
            })?;

            let keyword = record.get(keyword_idx).unwrap_or("").trim().to_string();

            let value_cell = record.get(value_idx).unwrap_or("").trim();
            let value: f64 =
                value_cell
                    .parse()
                    .map_err(|_| TrendcastError::InvalidValue {
                        row,
                        value: value_cell.to_string(),
                    })?;

            observations.push(Observation {
                date,
                keyword,
                value,
            });
        }

        Ok(Self::from_observations(observations))
    }

    /// Load a dataset from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(bytes)
    }

    /// Load a dataset from a file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Build a dataset from already-parsed observations, deduplicating on
    /// `(date, keyword)` with first occurrence winning.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut seen: HashSet<(NaiveDate, String)> = HashSet::new();
        let deduped = observations
            .into_iter()
            .filter(|obs| seen.insert((obs.date, obs.keyword.clone())))
            .collect();
        Self {
            observations: deduped,
        }
    }

    /// Number of observations after deduplication.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations in upload order, contiguous from zero.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Distinct keywords in order of first appearance.
    pub fn keywords(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.observations
            .iter()
            .filter(|obs| seen.insert(obs.keyword.as_str()))
            .map(|obs| obs.keyword.clone())
            .collect()
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}
