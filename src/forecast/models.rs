//! Baseline forecasting models
//!
//! Each candidate fits on one SKU's chronological series and reports its
//! in-sample RMSE over the whole history. Naive and SMA score a single
//! repeated constant; SES and Holt score their one-step-ahead fitted values.

use crate::error::ModelError;
use crate::forecast::optimize::{minimize_unit_interval, minimize_unit_square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default rolling window for the moving-average candidate
pub const DEFAULT_SMA_WINDOW: usize = 3;

/// Grid resolution for the SES smoothing parameter
const SES_GRID_STEPS: usize = 100;
/// Grid resolution per axis for Holt's (alpha, beta)
const HOLT_GRID_STEPS: usize = 20;
/// Coordinate refinement rounds for Holt
const HOLT_REFINE_ROUNDS: usize = 3;

/// Candidate model family.
///
/// Declaration order is the tie-break priority used by model selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Naive,
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "SES")]
    Ses,
    Holt,
}

impl ModelKind {
    /// All candidates in tie-break priority order
    pub const ALL: [ModelKind; 4] = [ModelKind::Naive, ModelKind::Sma, ModelKind::Ses, ModelKind::Holt];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Naive => "Naive",
            ModelKind::Sma => "SMA",
            ModelKind::Ses => "SES",
            ModelKind::Holt => "Holt",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters a fitted model settled on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelParams {
    None,
    Window { window: usize },
    Smoothing { alpha: f64 },
    SmoothingWithTrend { alpha: f64, beta: f64 },
}

/// Result of fitting one candidate to one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub kind: ModelKind,
    pub params: ModelParams,
    /// In-sample values the RMSE was scored on, one per observation
    pub fitted: Vec<f64>,
    pub rmse: f64,
    /// Final level state
    pub level: f64,
    /// Final trend state (0 for flat models)
    pub trend: f64,
}

impl FittedModel {
    /// Point forecasts for `horizon` steps after the last observation
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|h| self.level + self.trend * h as f64)
            .collect()
    }
}

/// A forecasting candidate
pub trait ForecastModel: Send + Sync {
    /// Model family
    fn kind(&self) -> ModelKind;

    /// Minimum number of observations required to fit
    fn min_observations(&self) -> usize;

    /// Fit to a chronological series.
    ///
    /// Implementations call [`ForecastModel::check_history`] first, so a
    /// short slice is an error rather than a panic.
    fn fit_series(&self, y: &[f64]) -> Result<FittedModel, ModelError>;

    /// `InsufficientHistory` unless `y` has at least `min_observations` points
    fn check_history(&self, y: &[f64]) -> Result<(), ModelError> {
        let required = self.min_observations();
        if y.len() < required {
            return Err(ModelError::InsufficientHistory {
                model: self.kind().as_str(),
                required,
                available: y.len(),
            });
        }
        Ok(())
    }

    /// Fit after checking history length
    fn fit(&self, y: &[f64]) -> Result<FittedModel, ModelError> {
        self.check_history(y)?;
        self.fit_series(y)
    }
}

/// Root-mean-squared error between equally long slices
pub fn rmse(actual: &[f64], fitted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != fitted.len() {
        return f64::NAN;
    }
    let sse: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    (sse / actual.len() as f64).sqrt()
}

fn checked_rmse(model: ModelKind, actual: &[f64], fitted: &[f64]) -> Result<f64, ModelError> {
    let score = rmse(actual, fitted);
    if score.is_finite() {
        Ok(score)
    } else {
        Err(ModelError::FitFailure {
            model: model.as_str(),
            reason: format!("non-finite RMSE ({})", score),
        })
    }
}

/// Last observation carried forward
#[derive(Debug, Clone, Copy, Default)]
pub struct Naive;

impl ForecastModel for Naive {
    fn kind(&self) -> ModelKind {
        ModelKind::Naive
    }

    fn min_observations(&self) -> usize {
        1
    }

    fn fit_series(&self, y: &[f64]) -> Result<FittedModel, ModelError> {
        self.check_history(y)?;
        let last = y[y.len() - 1];
        let fitted = vec![last; y.len()];
        let rmse = checked_rmse(self.kind(), y, &fitted)?;
        Ok(FittedModel {
            kind: self.kind(),
            params: ModelParams::None,
            fitted,
            rmse,
            level: last,
            trend: 0.0,
        })
    }
}

/// Simple moving average over a fixed window
#[derive(Debug, Clone, Copy)]
pub struct SimpleMovingAverage {
    window: usize,
}

impl SimpleMovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Rolling means for every position with a full window behind it
    pub fn rolling_means(&self, y: &[f64]) -> Vec<f64> {
        y.windows(self.window)
            .map(|w| w.iter().sum::<f64>() / self.window as f64)
            .collect()
    }
}

impl Default for SimpleMovingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_SMA_WINDOW)
    }
}

impl ForecastModel for SimpleMovingAverage {
    fn kind(&self) -> ModelKind {
        ModelKind::Sma
    }

    fn min_observations(&self) -> usize {
        self.window
    }

    fn fit_series(&self, y: &[f64]) -> Result<FittedModel, ModelError> {
        self.check_history(y)?;
        let means = self.rolling_means(y);
        let last = *means.last().ok_or_else(|| ModelError::FitFailure {
            model: self.kind().as_str(),
            reason: "no rolling values".to_string(),
        })?;

        // The last rolling mean, repeated over the whole history
        let fitted = vec![last; y.len()];
        let rmse = checked_rmse(self.kind(), y, &fitted)?;
        Ok(FittedModel {
            kind: self.kind(),
            params: ModelParams::Window {
                window: self.window,
            },
            fitted,
            rmse,
            level: last,
            trend: 0.0,
        })
    }
}

/// Simple exponential smoothing (level only)
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleExpSmoothing;

impl SimpleExpSmoothing {
    /// One-step fitted values and final level for a given alpha.
    ///
    /// The level starts at `y[0]`, so `fitted[0] == y[0]`.
    pub(crate) fn filter(y: &[f64], alpha: f64) -> (Vec<f64>, f64) {
        let mut level = y[0];
        let mut fitted = Vec::with_capacity(y.len());
        fitted.push(level);
        for &obs in &y[1..] {
            fitted.push(level);
            level += alpha * (obs - level);
        }
        (fitted, level)
    }

    fn sse(y: &[f64], alpha: f64) -> f64 {
        let mut level = y[0];
        let mut sse = 0.0;
        for &obs in &y[1..] {
            let resid = obs - level;
            sse += resid * resid;
            level += alpha * resid;
        }
        sse
    }
}

impl ForecastModel for SimpleExpSmoothing {
    fn kind(&self) -> ModelKind {
        ModelKind::Ses
    }

    fn min_observations(&self) -> usize {
        2
    }

    fn fit_series(&self, y: &[f64]) -> Result<FittedModel, ModelError> {
        self.check_history(y)?;
        let (alpha, sse) = minimize_unit_interval(|a| Self::sse(y, a), SES_GRID_STEPS);
        if !sse.is_finite() {
            return Err(ModelError::FitFailure {
                model: self.kind().as_str(),
                reason: "sum of squared errors is not finite".to_string(),
            });
        }

        let (fitted, level) = Self::filter(y, alpha);
        let rmse = checked_rmse(self.kind(), y, &fitted)?;
        Ok(FittedModel {
            kind: self.kind(),
            params: ModelParams::Smoothing { alpha },
            fitted,
            rmse,
            level,
            trend: 0.0,
        })
    }
}

/// Holt's linear trend method (level and trend)
#[derive(Debug, Clone, Copy, Default)]
pub struct HoltLinear;

impl HoltLinear {
    /// One-step fitted values and final (level, trend).
    ///
    /// Level starts at `y[0]` and trend at `y[1] - y[0]`; `fitted[0] == y[0]`.
    pub(crate) fn filter(y: &[f64], alpha: f64, beta: f64) -> (Vec<f64>, f64, f64) {
        let mut level = y[0];
        let mut trend = y[1] - y[0];
        let mut fitted = Vec::with_capacity(y.len());
        fitted.push(level);
        for &obs in &y[1..] {
            let forecast = level + trend;
            fitted.push(forecast);
            let new_level = alpha * obs + (1.0 - alpha) * forecast;
            trend = beta * (new_level - level) + (1.0 - beta) * trend;
            level = new_level;
        }
        (fitted, level, trend)
    }

    fn sse(y: &[f64], alpha: f64, beta: f64) -> f64 {
        let (fitted, _, _) = Self::filter(y, alpha, beta);
        y.iter().zip(&fitted).map(|(a, f)| (a - f).powi(2)).sum()
    }
}

impl ForecastModel for HoltLinear {
    fn kind(&self) -> ModelKind {
        ModelKind::Holt
    }

    fn min_observations(&self) -> usize {
        3
    }

    fn fit_series(&self, y: &[f64]) -> Result<FittedModel, ModelError> {
        self.check_history(y)?;
        let ((alpha, beta), sse) = minimize_unit_square(
            |a, b| Self::sse(y, a, b),
            HOLT_GRID_STEPS,
            HOLT_REFINE_ROUNDS,
        );
        if !sse.is_finite() {
            return Err(ModelError::FitFailure {
                model: self.kind().as_str(),
                reason: "sum of squared errors is not finite".to_string(),
            });
        }

        let (fitted, level, trend) = Self::filter(y, alpha, beta);
        let rmse = checked_rmse(self.kind(), y, &fitted)?;
        Ok(FittedModel {
            kind: self.kind(),
            params: ModelParams::SmoothingWithTrend { alpha, beta },
            fitted,
            rmse,
            level,
            trend,
        })
    }
}

/// The four baseline candidates in tie-break priority order
pub fn default_candidates(sma_window: usize) -> Vec<Box<dyn ForecastModel>> {
    vec![
        Box::new(Naive),
        Box::new(SimpleMovingAverage::new(sma_window)),
        Box::new(SimpleExpSmoothing),
        Box::new(HoltLinear),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rmse() {
        assert_relative_eq!(rmse(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_relative_eq!(rmse(&[0.0, 0.0], &[3.0, 4.0]), (12.5f64).sqrt());
        assert!(rmse(&[], &[]).is_nan());
    }

    #[test]
    fn test_naive_scores_against_last_value() {
        let fit = Naive.fit(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        // residuals 3, 2, 1, 0
        assert_relative_eq!(fit.rmse, (14.0f64 / 4.0).sqrt());
        assert_eq!(fit.forecast(2), vec![4.0, 4.0]);
    }

    #[test]
    fn test_sma_requires_window() {
        let err = SimpleMovingAverage::default().fit(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::InsufficientHistory {
                model: "SMA",
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_sma_scores_whole_history() {
        let sma = SimpleMovingAverage::default();
        let y = [3.0, 6.0, 9.0, 12.0];
        assert_eq!(sma.rolling_means(&y), vec![6.0, 9.0]);
        let fit = sma.fit(&y).unwrap();
        assert_eq!(fit.level, 9.0);
        assert_eq!(fit.fitted, vec![9.0; 4]);
        // residuals -6, -3, 0, 3
        assert_relative_eq!(fit.rmse, (54.0f64 / 4.0).sqrt());
        assert_eq!(fit.forecast(3), vec![9.0; 3]);
    }

    #[test]
    fn test_short_series_is_an_error_not_a_panic() {
        let short = |err: Result<FittedModel, ModelError>| {
            matches!(err, Err(ModelError::InsufficientHistory { .. }))
        };
        assert!(short(Naive.fit_series(&[])));
        assert!(short(SimpleMovingAverage::default().fit_series(&[1.0])));
        assert!(short(SimpleExpSmoothing.fit_series(&[1.0])));
        assert!(short(HoltLinear.fit_series(&[1.0, 2.0])));
    }

    #[test]
    fn test_ses_constant_series() {
        let fit = SimpleExpSmoothing.fit(&[50.0; 8]).unwrap();
        assert_eq!(fit.rmse, 0.0);
        assert_eq!(fit.forecast(3), vec![50.0; 3]);
    }

    #[test]
    fn test_ses_tracks_level_shift() {
        let y = [10.0, 10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0];
        let fit = SimpleExpSmoothing.fit(&y).unwrap();
        let ModelParams::Smoothing { alpha } = fit.params else {
            panic!("expected smoothing params");
        };
        // A single permanent shift is best followed immediately
        assert!(alpha > 0.9);
        assert_relative_eq!(fit.level, 20.0, epsilon = 1e-3);
    }

    #[test]
    fn test_ses_filter_first_value() {
        let (fitted, level) = SimpleExpSmoothing::filter(&[4.0, 8.0], 0.5);
        assert_eq!(fitted, vec![4.0, 4.0]);
        assert_eq!(level, 6.0);
    }

    #[test]
    fn test_holt_linear_series_is_exact() {
        let y: Vec<f64> = (0..12).map(|i| 5.0 + 2.0 * i as f64).collect();
        let fit = HoltLinear.fit(&y).unwrap();
        assert_relative_eq!(fit.rmse, 0.0, epsilon = 1e-9);
        let forecast = fit.forecast(3);
        assert_relative_eq!(forecast[0], 29.0, epsilon = 1e-9);
        assert_relative_eq!(forecast[1], 31.0, epsilon = 1e-9);
        assert_relative_eq!(forecast[2], 33.0, epsilon = 1e-9);
    }

    #[test]
    fn test_holt_requires_three_points() {
        assert!(matches!(
            HoltLinear.fit(&[1.0, 2.0]),
            Err(ModelError::InsufficientHistory { required: 3, .. })
        ));
    }

    #[test]
    fn test_overflowing_series_fails_cleanly() {
        let y = [f64::MAX, -f64::MAX, f64::MAX, -f64::MAX];
        assert!(matches!(
            SimpleExpSmoothing.fit(&y),
            Err(ModelError::FitFailure { .. })
        ));
        assert!(matches!(
            HoltLinear.fit(&y),
            Err(ModelError::FitFailure { .. })
        ));
    }

    #[test]
    fn test_candidate_order() {
        let kinds: Vec<ModelKind> = default_candidates(3).iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, ModelKind::ALL.to_vec());
    }
}
