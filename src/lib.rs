//! # trendcast
//!
//! Per-keyword trend forecasting pipeline: load a CSV of time-stamped
//! keyword metrics, partition it into one series per keyword, run a
//! configurable forecasting model over each selected keyword in isolation,
//! and shape/export the per-keyword forecasts.
//!
//! Data flow: raw upload → [`dataset::Dataset`] → [`partition::Partition`] →
//! [`orchestrator::run`] (one model invocation per keyword) →
//! [`forecast::ForecastTable`] → [`export`].
//!
//! The whole pipeline is synchronous and recomputed in full per run; there
//! is no caching across runs and no background work. Per-keyword failures
//! are isolated: a degenerate series yields a `Failed` outcome for that
//! keyword while the others proceed.

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod forecast;
pub mod model;
pub mod orchestrator;
pub mod partition;

pub use error::{Result, TrendcastError};

pub mod prelude {
    pub use crate::config::ForecastConfig;
    pub use crate::dataset::{Dataset, Observation};
    pub use crate::error::{Result, TrendcastError};
    pub use crate::export::{export_future_window, forecast_csv_bytes, forecast_file_name};
    pub use crate::forecast::{ForecastRow, ForecastTable};
    pub use crate::model::{BoxedTrendModel, ModelFactory, SeasonalTrend, TrendModel};
    pub use crate::orchestrator::{run, KeywordOutcome, Outcome, SkipReason, MIN_HISTORY};
    pub use crate::partition::{KeywordSeries, Partition};
}
