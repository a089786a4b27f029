//! Per-run forecast configuration.
//!
//! One configuration applies uniformly to every selected keyword in a run.
//! It is rebuilt from the current control values on each run and never
//! persisted between runs.

use crate::error::{Result, TrendcastError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Forecast horizon control range offered to front ends, in days.
pub const HORIZON_RANGE: RangeInclusive<u32> = 7..=90;

/// Changepoint sensitivity control range offered to front ends.
pub const CHANGEPOINT_RANGE: RangeInclusive<f64> = 0.01..=0.8;

/// Model hyperparameters for a single forecasting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Fit a yearly seasonal component.
    pub yearly_seasonality: bool,
    /// Fit a weekly seasonal component.
    pub weekly_seasonality: bool,
    /// Fit a daily seasonal component. Ignored by models operating on
    /// date-granular data.
    pub daily_seasonality: bool,
    /// How readily the trend slope may change, in `(0, 1]`.
    pub changepoint_prior_scale: f64,
    /// Number of future calendar days to forecast.
    pub horizon_days: u32,
    /// Width of the uncertainty interval, in `(0, 1)`.
    pub interval_width: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            yearly_seasonality: true,
            weekly_seasonality: true,
            daily_seasonality: false,
            changepoint_prior_scale: 0.1,
            horizon_days: 30,
            interval_width: 0.8,
        }
    }
}

impl ForecastConfig {
    /// Validate the hard invariants.
    ///
    /// Front-end control ranges ([`HORIZON_RANGE`], [`CHANGEPOINT_RANGE`])
    /// are advisory; only the invariants below are enforced here.
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(TrendcastError::InvalidParameter(
                "horizon_days must be positive".to_string(),
            ));
        }
        if !(self.changepoint_prior_scale > 0.0 && self.changepoint_prior_scale <= 1.0) {
            return Err(TrendcastError::InvalidParameter(format!(
                "changepoint_prior_scale must be in (0, 1], got {}",
                self.changepoint_prior_scale
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(TrendcastError::InvalidParameter(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        Ok(())
    }

    pub fn with_horizon_days(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    pub fn with_seasonality(mut self, yearly: bool, weekly: bool, daily: bool) -> Self {
        self.yearly_seasonality = yearly;
        self.weekly_seasonality = weekly;
        self.daily_seasonality = daily;
        self
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_control_surface() {
        let config = ForecastConfig::default();

        assert!(config.yearly_seasonality);
        assert!(config.weekly_seasonality);
        assert!(!config.daily_seasonality);
        assert_eq!(config.changepoint_prior_scale, 0.1);
        assert_eq!(config.horizon_days, 30);
        assert_eq!(config.interval_width, 0.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_horizon() {
        let config = ForecastConfig::default().with_horizon_days(0);
        assert!(matches!(
            config.validate(),
            Err(TrendcastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_changepoint_scale() {
        for scale in [0.0, -0.5, 1.5, f64::NAN] {
            let config = ForecastConfig::default().with_changepoint_prior_scale(scale);
            assert!(
                config.validate().is_err(),
                "scale {} should be rejected",
                scale
            );
        }

        let config = ForecastConfig::default().with_changepoint_prior_scale(1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_interval_width() {
        for width in [0.0, 1.0, -0.1] {
            let config = ForecastConfig::default().with_interval_width(width);
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn deserializes_with_defaults_for_missing_fields() {
        let config: ForecastConfig = serde_json::from_str(r#"{"horizon_days": 7}"#).unwrap();

        assert_eq!(config.horizon_days, 7);
        assert!(config.yearly_seasonality);
        assert_eq!(config.changepoint_prior_scale, 0.1);
    }
}
