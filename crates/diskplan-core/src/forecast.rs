//! Monthly time-series forecasting.

use diskplan_domain::{add_months, first_of_month, SeriesPoint};

use crate::CoreError;

/// Smallest history a forecaster accepts.
pub const MIN_FORECAST_POINTS: usize = 2;

/// Default number of monthly periods projected past the last observation.
pub const DEFAULT_FORECAST_HORIZON: usize = 6;

/// Fits a dated history and projects it forward one month per period.
pub trait Forecaster {
    /// Returns `horizon` predicted points dated on consecutive month starts
    /// after the last historical point.
    ///
    /// Histories shorter than [`MIN_FORECAST_POINTS`] are rejected; callers are
    /// expected to check and fall back to a simpler estimate.
    fn forecast(&self, history: &[SeriesPoint], horizon: usize)
        -> Result<Vec<SeriesPoint>, CoreError>;
}

/// Holt's linear-trend exponential smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltLinearForecaster {
    alpha: f64,
    beta: f64,
}

impl HoltLinearForecaster {
    pub const DEFAULT_ALPHA: f64 = 0.5;
    pub const DEFAULT_BETA: f64 = 0.3;

    /// `alpha` smooths the level, `beta` the trend. Both must be in `(0, 1]`.
    pub fn new(alpha: f64, beta: f64) -> Result<Self, CoreError> {
        let valid = |value: f64| value > 0.0 && value <= 1.0;
        if !valid(alpha) || !valid(beta) {
            return Err(CoreError::Validation(format!(
                "smoothing factors must be in (0, 1], got alpha={alpha} beta={beta}"
            )));
        }
        Ok(Self { alpha, beta })
    }
}

impl Default for HoltLinearForecaster {
    fn default() -> Self {
        Self {
            alpha: Self::DEFAULT_ALPHA,
            beta: Self::DEFAULT_BETA,
        }
    }
}

impl Forecaster for HoltLinearForecaster {
    fn forecast(
        &self,
        history: &[SeriesPoint],
        horizon: usize,
    ) -> Result<Vec<SeriesPoint>, CoreError> {
        if history.len() < MIN_FORECAST_POINTS {
            return Err(CoreError::InsufficientHistory {
                required: MIN_FORECAST_POINTS,
                available: history.len(),
            });
        }
        if let Some(point) = history.iter().find(|point| !point.value.is_finite()) {
            return Err(CoreError::Validation(format!(
                "history value on {} is not a finite number",
                point.date
            )));
        }

        let mut level = history[0].value;
        let mut trend = history[1].value - history[0].value;
        for point in &history[1..] {
            let previous_level = level;
            level = self.alpha * point.value + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - previous_level) + (1.0 - self.beta) * trend;
        }

        let last_month = first_of_month(history[history.len() - 1].date);
        Ok((1..=horizon)
            .map(|step| {
                SeriesPoint::new(
                    add_months(last_month, step as i32),
                    level + trend * step as f64,
                )
            })
            .collect())
    }
}

/// Final point of a forecast, the one planning decisions use.
pub fn last_prediction(forecast: &[SeriesPoint]) -> Option<f64> {
    forecast.last().map(|point| point.value)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn series(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(idx, value)| SeriesPoint::new(add_months(month(2024, 1), idx as i32), *value))
            .collect()
    }

    #[test]
    fn rejects_short_history() {
        let err = HoltLinearForecaster::default()
            .forecast(&series(&[1.0]), 6)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientHistory {
                required: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn extrapolates_a_straight_line_exactly() {
        let forecast = HoltLinearForecaster::default()
            .forecast(&series(&[1.0, 2.0, 3.0, 4.0]), 3)
            .unwrap();
        assert_eq!(forecast.len(), 3);
        for (point, expected) in forecast.iter().zip([5.0, 6.0, 7.0]) {
            assert!((point.value - expected).abs() < 1e-9, "{} != {}", point.value, expected);
        }
    }

    #[test]
    fn predictions_are_dated_on_following_months() {
        let forecast = HoltLinearForecaster::default()
            .forecast(&series(&[2.0, 2.0]), 6)
            .unwrap();
        assert_eq!(forecast.len(), 6);
        assert_eq!(forecast[0].date, month(2024, 3));
        assert_eq!(forecast[5].date, month(2024, 8));
        assert_eq!(last_prediction(&forecast), Some(2.0));
    }

    #[test]
    fn rejects_invalid_parameters_and_values() {
        assert!(HoltLinearForecaster::new(0.0, 0.5).is_err());
        assert!(HoltLinearForecaster::new(0.5, 1.5).is_err());
        let err = HoltLinearForecaster::default()
            .forecast(&series(&[1.0, f64::NAN]), 2)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
