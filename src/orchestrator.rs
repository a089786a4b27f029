//! Per-keyword forecast orchestration.
//!
//! For each selected keyword, in selection order: validate sufficient
//! history, build a fresh configured model, fit and predict, and shape the
//! result. Model failures are caught per keyword, so one degenerate series
//! never aborts forecasting for the others in the same run.

use crate::config::ForecastConfig;
use crate::dataset::Dataset;
use crate::error::{Result, TrendcastError};
use crate::forecast::ForecastTable;
use crate::model::ModelFactory;
use crate::partition::{KeywordSeries, Partition};
use std::fmt;
use tracing::{debug, info, warn};

/// Minimum number of observations a series needs before a fit is attempted.
pub const MIN_HISTORY: usize = 10;

/// Why a keyword was skipped without attempting a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The series has fewer than [`MIN_HISTORY`] observations.
    InsufficientHistory { got: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientHistory { got } => write!(
                f,
                "insufficient history: {} observations (need {})",
                got, MIN_HISTORY
            ),
        }
    }
}

/// Per-keyword outcome of a forecasting run.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The keyword was skipped before fitting; a warning, not an error.
    Skipped { reason: SkipReason },
    /// Fit or predict failed for this keyword only; message kept verbatim.
    Failed { message: String },
    /// Normal case: the full fitted+forecast table, future rows last.
    Succeeded { result: ForecastTable },
}

impl Outcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// The forecast table for a succeeded keyword.
    pub fn result(&self) -> Option<&ForecastTable> {
        match self {
            Outcome::Succeeded { result } => Some(result),
            _ => None,
        }
    }
}

/// A keyword paired with its outcome, in selection order.
#[derive(Debug, Clone)]
pub struct KeywordOutcome {
    pub keyword: String,
    pub outcome: Outcome,
}

/// Run the forecast loop over the selected keywords.
///
/// Keywords are processed strictly sequentially in selection order; ordering
/// affects only display sequence, not correctness. Every selected keyword
/// must exist in the dataset — a missing one is a caller contract violation
/// and fails the whole run, as does an invalid configuration. No limit is
/// imposed on dataset size or selection size; the host decides.
pub fn run(
    dataset: &Dataset,
    selected: &[String],
    config: &ForecastConfig,
    factory: &ModelFactory,
) -> Result<Vec<KeywordOutcome>> {
    config.validate()?;
    let partition = Partition::from_dataset(dataset);

    let mut outcomes = Vec::with_capacity(selected.len());
    for keyword in selected {
        let series = partition.get(keyword).ok_or_else(|| {
            TrendcastError::InvalidParameter(format!(
                "selected keyword '{}' is not present in the dataset",
                keyword
            ))
        })?;

        debug!(keyword = %keyword, observations = series.len(), "forecasting keyword");
        let outcome = forecast_keyword(series, config, factory);

        match &outcome {
            Outcome::Skipped { reason } => {
                warn!(keyword = %keyword, %reason, "keyword skipped");
            }
            Outcome::Failed { message } => {
                warn!(keyword = %keyword, error = %message, "keyword forecast failed");
            }
            Outcome::Succeeded { result } => {
                debug!(keyword = %keyword, rows = result.len(), "keyword forecast succeeded");
            }
        }

        outcomes.push(KeywordOutcome {
            keyword: keyword.clone(),
            outcome,
        });
    }

    info!(
        selected = selected.len(),
        succeeded = outcomes.iter().filter(|o| o.outcome.is_succeeded()).count(),
        skipped = outcomes.iter().filter(|o| o.outcome.is_skipped()).count(),
        failed = outcomes.iter().filter(|o| o.outcome.is_failed()).count(),
        "forecast run complete"
    );

    Ok(outcomes)
}

/// Fit and predict one keyword, converting any model error into `Failed`.
fn forecast_keyword(
    series: &KeywordSeries,
    config: &ForecastConfig,
    factory: &ModelFactory,
) -> Outcome {
    if series.len() < MIN_HISTORY {
        return Outcome::Skipped {
            reason: SkipReason::InsufficientHistory { got: series.len() },
        };
    }

    match fit_and_predict(series, config, factory) {
        Ok(result) => Outcome::Succeeded { result },
        Err(err) => Outcome::Failed {
            message: err.to_string(),
        },
    }
}

fn fit_and_predict(
    series: &KeywordSeries,
    config: &ForecastConfig,
    factory: &ModelFactory,
) -> Result<ForecastTable> {
    let mut model = factory.create(config);
    model.fit(series)?;

    let timeline = model.extend_timeline(config.horizon_days)?;
    let rows = model.predict(&timeline)?;

    Ok(ForecastTable::new(rows))
}
