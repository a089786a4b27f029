//! Forecast result structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast row: point estimate plus uncertainty interval for a date.
///
/// Field names follow the conventional forecast-table columns so that CSV
/// serialization produces the `ds,yhat,yhat_lower,yhat_upper` header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Timestamp of the estimate.
    pub ds: NaiveDate,
    /// Point estimate.
    pub yhat: f64,
    /// Lower bound of the uncertainty interval.
    pub yhat_lower: f64,
    /// Upper bound of the uncertainty interval.
    pub yhat_upper: f64,
}

/// An ordered forecast covering the historical fit range and the future
/// horizon, in chronological order with the future rows appended last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub fn new(rows: Vec<ForecastRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, history first, future rows last.
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// The final `horizon_days` rows: exactly the future window, since the
    /// timeline extension appended them at the end in chronological order.
    pub fn future_window(&self, horizon_days: u32) -> &[ForecastRow] {
        let horizon = horizon_days as usize;
        let start = self.rows.len().saturating_sub(horizon);
        &self.rows[start..]
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.ds)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.ds)
    }
}

impl FromIterator<ForecastRow> for ForecastTable {
    fn from_iter<I: IntoIterator<Item = ForecastRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
