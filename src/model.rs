//! Trend model interface and the built-in additive model.
//!
//! The orchestrator only depends on the [`TrendModel`] trait; any forecasting
//! backend can be plugged in through a [`ModelFactory`]. [`SeasonalTrend`] is
//! the built-in collaborator: an additive trend + seasonality model with
//! normal-theory uncertainty intervals.

use crate::config::ForecastConfig;
use crate::error::{Result, TrendcastError};
use crate::forecast::ForecastRow;
use crate::partition::KeywordSeries;
use chrono::{Datelike, Duration, NaiveDate};

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn TrendModel>`.
pub trait TrendModel {
    /// Fit the model to a keyword series.
    fn fit(&mut self, series: &KeywordSeries) -> Result<()>;

    /// The full fitted timeline plus `horizon_days` calendar days appended
    /// chronologically after the last historical date.
    fn extend_timeline(&self, horizon_days: u32) -> Result<Vec<NaiveDate>>;

    /// Point estimate and uncertainty bounds for every timeline date.
    fn predict(&self, timeline: &[NaiveDate]) -> Result<Vec<ForecastRow>>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed trend model trait objects.
pub type BoxedTrendModel = Box<dyn TrendModel>;

/// Factory producing a fresh, configured model per keyword.
pub struct ModelFactory {
    /// Display name of the model family.
    pub name: &'static str,
    build: Box<dyn Fn(&ForecastConfig) -> BoxedTrendModel + Send + Sync>,
}

impl ModelFactory {
    /// Create a factory from a build closure.
    pub fn new<F>(name: &'static str, build: F) -> Self
    where
        F: Fn(&ForecastConfig) -> BoxedTrendModel + Send + Sync + 'static,
    {
        Self {
            name,
            build: Box::new(build),
        }
    }

    /// Factory for the built-in [`SeasonalTrend`] model.
    pub fn seasonal_trend() -> Self {
        Self::new("SeasonalTrend", |config| {
            Box::new(SeasonalTrend::from_config(config))
        })
    }

    /// Create a new model instance for the given run configuration.
    pub fn create(&self, config: &ForecastConfig) -> BoxedTrendModel {
        (self.build)(config)
    }
}

impl Default for ModelFactory {
    fn default() -> Self {
        Self::seasonal_trend()
    }
}

/// Built-in additive trend + seasonality model.
///
/// The trend is an exponentially weighted least-squares line over the day
/// index; `changepoint_prior_scale` controls the weight decay, so a higher
/// sensitivity discounts old observations faster and lets the fitted slope
/// track recent shifts. Weekly seasonality is a per-weekday mean deviation
/// from trend, yearly a per-month mean deviation. Daily seasonality is
/// accepted but has no effect on date-granular data.
///
/// Uncertainty intervals use the residual standard deviation with a normal
/// quantile at the configured interval width, widening with the square root
/// of the number of days past the last observation.
#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    yearly: bool,
    weekly: bool,
    changepoint_prior_scale: f64,
    interval_width: f64,
    state: Option<FittedState>,
}

#[derive(Debug, Clone)]
struct FittedState {
    /// Historical dates in chronological order.
    dates: Vec<NaiveDate>,
    origin: NaiveDate,
    last: NaiveDate,
    intercept: f64,
    slope: f64,
    weekday_effects: [f64; 7],
    month_effects: [f64; 12],
    sigma: f64,
}

impl SeasonalTrend {
    /// Build an unfitted model from a run configuration.
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            yearly: config.yearly_seasonality,
            weekly: config.weekly_seasonality,
            changepoint_prior_scale: config.changepoint_prior_scale,
            interval_width: config.interval_width,
            state: None,
        }
    }

    fn fitted(&self) -> Result<&FittedState> {
        self.state.as_ref().ok_or(TrendcastError::FitRequired)
    }

    fn estimate(&self, state: &FittedState, date: NaiveDate) -> f64 {
        let x = (date - state.origin).num_days() as f64;
        let mut y = state.intercept + state.slope * x;
        if self.weekly {
            y += state.weekday_effects[date.weekday().num_days_from_monday() as usize];
        }
        if self.yearly {
            y += state.month_effects[date.month0() as usize];
        }
        y
    }
}

impl TrendModel for SeasonalTrend {
    fn fit(&mut self, series: &KeywordSeries) -> Result<()> {
        if series.is_empty() {
            return Err(TrendcastError::EmptyData);
        }
        if series.values().any(|v| !v.is_finite()) {
            return Err(TrendcastError::ComputationError(format!(
                "non-finite value in series '{}'",
                series.keyword()
            )));
        }

        let mut points: Vec<(NaiveDate, f64)> = series.points().to_vec();
        points.sort_by_key(|(d, _)| *d);

        let dates: Vec<NaiveDate> = points.iter().map(|(d, _)| *d).collect();
        let origin = dates[0];
        let last = dates[dates.len() - 1];

        let xs: Vec<f64> = dates
            .iter()
            .map(|d| (*d - origin).num_days() as f64)
            .collect();
        let ys: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        let x_last = xs[xs.len() - 1];

        // Recency weights: the decay rate scales with changepoint sensitivity,
        // so a reactive trend forgets old observations faster.
        let decay = self.changepoint_prior_scale / 30.0;
        let weights: Vec<f64> = xs.iter().map(|x| (-decay * (x_last - x)).exp()).collect();

        let (intercept, slope) = weighted_line(&xs, &ys, &weights);

        let detrended: Vec<f64> = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| y - (intercept + slope * x))
            .collect();

        let weekday_effects = if self.weekly {
            bucket_means(&dates, &detrended, 7, |d| {
                d.weekday().num_days_from_monday() as usize
            })
        } else {
            [0.0; 7].to_vec()
        };

        let deseasoned: Vec<f64> = dates
            .iter()
            .zip(&detrended)
            .map(|(d, r)| r - weekday_effects[d.weekday().num_days_from_monday() as usize])
            .collect();

        let month_effects = if self.yearly {
            bucket_means(&dates, &deseasoned, 12, |d| d.month0() as usize)
        } else {
            [0.0; 12].to_vec()
        };

        let residuals: Vec<f64> = dates
            .iter()
            .zip(&deseasoned)
            .map(|(d, r)| r - month_effects[d.month0() as usize])
            .collect();
        let n = residuals.len() as f64;
        let sigma = (residuals.iter().map(|r| r * r).sum::<f64>() / n).sqrt();

        let mut weekday_arr = [0.0; 7];
        weekday_arr.copy_from_slice(&weekday_effects);
        let mut month_arr = [0.0; 12];
        month_arr.copy_from_slice(&month_effects);

        self.state = Some(FittedState {
            dates,
            origin,
            last,
            intercept,
            slope,
            weekday_effects: weekday_arr,
            month_effects: month_arr,
            sigma,
        });

        Ok(())
    }

    fn extend_timeline(&self, horizon_days: u32) -> Result<Vec<NaiveDate>> {
        let state = self.fitted()?;

        let mut timeline = state.dates.clone();
        timeline.extend((1..=i64::from(horizon_days)).map(|k| state.last + Duration::days(k)));
        Ok(timeline)
    }

    fn predict(&self, timeline: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        let state = self.fitted()?;

        let z = quantile_normal((1.0 + self.interval_width) / 2.0);
        let rows = timeline
            .iter()
            .map(|&date| {
                let yhat = self.estimate(state, date);
                let steps_ahead = (date - state.last).num_days().max(0);
                let se = if steps_ahead > 0 {
                    state.sigma * (steps_ahead as f64).sqrt()
                } else {
                    state.sigma
                };
                ForecastRow {
                    ds: date,
                    yhat,
                    yhat_lower: yhat - z * se,
                    yhat_upper: yhat + z * se,
                }
            })
            .collect();

        Ok(rows)
    }

    fn name(&self) -> &str {
        "SeasonalTrend"
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}

/// Weighted least-squares line through `(x, y)` points.
///
/// Falls back to a flat line at the weighted mean when the x spread is
/// degenerate (single observation).
fn weighted_line(xs: &[f64], ys: &[f64], weights: &[f64]) -> (f64, f64) {
    let w_sum: f64 = weights.iter().sum();
    let x_mean: f64 = xs.iter().zip(weights).map(|(x, w)| x * w).sum::<f64>() / w_sum;
    let y_mean: f64 = ys.iter().zip(weights).map(|(y, w)| y * w).sum::<f64>() / w_sum;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for ((x, y), w) in xs.iter().zip(ys).zip(weights) {
        sxx += w * (x - x_mean) * (x - x_mean);
        sxy += w * (x - x_mean) * (y - y_mean);
    }

    if sxx.abs() < f64::EPSILON {
        return (y_mean, 0.0);
    }

    let slope = sxy / sxx;
    (y_mean - slope * x_mean, slope)
}

/// Mean residual per calendar bucket; empty buckets contribute zero.
fn bucket_means<F>(dates: &[NaiveDate], residuals: &[f64], buckets: usize, index: F) -> Vec<f64>
where
    F: Fn(&NaiveDate) -> usize,
{
    let mut sums = vec![0.0; buckets];
    let mut counts = vec![0usize; buckets];
    for (date, r) in dates.iter().zip(residuals) {
        let i = index(date);
        sums[i] += r;
        counts[i] += 1;
    }
    sums.iter()
        .zip(&counts)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect()
}

/// Approximate quantile function for the standard normal distribution
/// (Abramowitz and Stegun formula 26.2.23).
fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let t = if p < 0.5 {
        (-2.0 * p.ln()).sqrt()
    } else {
        (-2.0 * (1.0 - p).ln()).sqrt()
    };

    let c0 = 2.515517;
    let c1 = 0.802853;
    let c2 = 0.010328;
    let d1 = 1.432788;
    let d2 = 0.189269;
    let d3 = 0.001308;

    let result = t - (c0 + c1 * t + c2 * t * t) / (1.0 + d1 * t + d2 * t * t + d3 * t * t * t);

    if p < 0.5 {
        -result
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_series(n: usize, f: impl Fn(usize) -> f64) -> KeywordSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = (0..n)
            .map(|i| (start + Duration::days(i as i64), f(i)))
            .collect();
        KeywordSeries::new("test", points)
    }

    fn trend_only_config() -> ForecastConfig {
        ForecastConfig::default().with_seasonality(false, false, false)
    }

    #[test]
    fn requires_fit_before_prediction() {
        let model = SeasonalTrend::from_config(&ForecastConfig::default());

        assert!(!model.is_fitted());
        assert!(matches!(
            model.extend_timeline(7),
            Err(TrendcastError::FitRequired)
        ));
        assert!(matches!(
            model.predict(&[]),
            Err(TrendcastError::FitRequired)
        ));
    }

    #[test]
    fn rejects_empty_series() {
        let mut model = SeasonalTrend::from_config(&ForecastConfig::default());
        let series = KeywordSeries::new("empty", vec![]);

        assert!(matches!(
            model.fit(&series),
            Err(TrendcastError::EmptyData)
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut model = SeasonalTrend::from_config(&ForecastConfig::default());
        let series = make_series(15, |i| if i == 7 { f64::NAN } else { i as f64 });

        assert!(matches!(
            model.fit(&series),
            Err(TrendcastError::ComputationError(_))
        ));
    }

    #[test]
    fn extend_timeline_appends_future_days_chronologically() {
        let mut model = SeasonalTrend::from_config(&ForecastConfig::default());
        model.fit(&make_series(10, |i| i as f64)).unwrap();

        let timeline = model.extend_timeline(5).unwrap();

        assert_eq!(timeline.len(), 15);
        let last_history = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(timeline[9], last_history);
        assert_eq!(timeline[10], last_history + Duration::days(1));
        assert_eq!(timeline[14], last_history + Duration::days(5));
        assert!(timeline.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn recovers_exact_linear_trend() {
        let mut model = SeasonalTrend::from_config(&trend_only_config());
        model.fit(&make_series(30, |i| 2.0 + 3.0 * i as f64)).unwrap();

        let timeline = model.extend_timeline(3).unwrap();
        let rows = model.predict(&timeline).unwrap();

        // Day index 30..32 continue the line exactly; residuals are zero so
        // the interval collapses onto the point estimate.
        assert_relative_eq!(rows[30].yhat, 2.0 + 3.0 * 30.0, epsilon = 1e-6);
        assert_relative_eq!(rows[32].yhat, 2.0 + 3.0 * 32.0, epsilon = 1e-6);
        assert_relative_eq!(rows[32].yhat_lower, rows[32].yhat, epsilon = 1e-6);
        assert_relative_eq!(rows[32].yhat_upper, rows[32].yhat, epsilon = 1e-6);
    }

    #[test]
    fn captures_weekly_pattern() {
        let config = ForecastConfig::default().with_seasonality(false, true, false);
        let mut model = SeasonalTrend::from_config(&config);
        // Flat level 10 with a +5 bump every Monday (2024-01-01 is a Monday).
        let series = make_series(28, |i| if i % 7 == 0 { 15.0 } else { 10.0 });
        model.fit(&series).unwrap();

        let timeline = model.extend_timeline(7).unwrap();
        let rows = model.predict(&timeline).unwrap();
        let future = &rows[28..];

        // 2024-01-29 is again a Monday.
        let monday = future[0];
        let tuesday = future[1];
        assert!(
            monday.yhat > tuesday.yhat + 3.0,
            "monday {} should sit well above tuesday {}",
            monday.yhat,
            tuesday.yhat
        );
    }

    #[test]
    fn bounds_always_bracket_the_point_estimate() {
        let mut model = SeasonalTrend::from_config(&ForecastConfig::default());
        let series = make_series(60, |i| 50.0 + (i as f64 * 0.7).sin() * 10.0);
        model.fit(&series).unwrap();

        let timeline = model.extend_timeline(30).unwrap();
        let rows = model.predict(&timeline).unwrap();

        assert_eq!(rows.len(), 90);
        for row in &rows {
            assert!(
                row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper,
                "bounds violated at {}",
                row.ds
            );
        }
    }

    #[test]
    fn future_intervals_widen_with_horizon() {
        let mut model = SeasonalTrend::from_config(&trend_only_config());
        let series = make_series(40, |i| i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 });
        model.fit(&series).unwrap();

        let timeline = model.extend_timeline(10).unwrap();
        let rows = model.predict(&timeline).unwrap();
        let future = &rows[40..];

        for w in future.windows(2) {
            let width_prev = w[0].yhat_upper - w[0].yhat_lower;
            let width_curr = w[1].yhat_upper - w[1].yhat_lower;
            assert!(width_curr > width_prev);
        }
    }

    #[test]
    fn fit_is_deterministic() {
        let series = make_series(45, |i| 20.0 + (i as f64).sqrt() * 3.0);

        let mut a = SeasonalTrend::from_config(&ForecastConfig::default());
        let mut b = SeasonalTrend::from_config(&ForecastConfig::default());
        a.fit(&series).unwrap();
        b.fit(&series).unwrap();

        let timeline = a.extend_timeline(14).unwrap();
        assert_eq!(timeline, b.extend_timeline(14).unwrap());
        assert_eq!(
            a.predict(&timeline).unwrap(),
            b.predict(&timeline).unwrap()
        );
    }

    #[test]
    fn handles_unsorted_input_order() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut points: Vec<(NaiveDate, f64)> = (0..20)
            .map(|i| (start + Duration::days(i), 5.0 + i as f64))
            .collect();
        points.reverse();
        let series = KeywordSeries::new("reversed", points);

        let mut model = SeasonalTrend::from_config(&trend_only_config());
        model.fit(&series).unwrap();

        let timeline = model.extend_timeline(1).unwrap();
        assert_eq!(timeline.last(), Some(&(start + Duration::days(20))));
    }

    #[test]
    fn factory_creates_independent_instances() {
        let factory = ModelFactory::seasonal_trend();
        let config = ForecastConfig::default();

        let mut first = factory.create(&config);
        let second = factory.create(&config);

        first.fit(&make_series(12, |i| i as f64)).unwrap();

        assert_eq!(factory.name, "SeasonalTrend");
        assert!(first.is_fitted());
        assert!(!second.is_fitted());
    }

    #[test]
    fn quantile_normal_known_values() {
        assert_relative_eq!(quantile_normal(0.5), 0.0, epsilon = 0.01);
        assert_relative_eq!(quantile_normal(0.975), 1.96, epsilon = 0.01);
        assert_relative_eq!(quantile_normal(0.025), -1.96, epsilon = 0.01);
        assert_eq!(quantile_normal(0.0), f64::NEG_INFINITY);
        assert_eq!(quantile_normal(1.0), f64::INFINITY);
    }
}
