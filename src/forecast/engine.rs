//! Per-SKU model selection and forecasting
//!
//! Every candidate is fitted independently. A candidate that cannot fit is
//! scored `+inf` and kept in the diagnostics; the lowest finite RMSE wins,
//! with ties going to the earliest candidate in priority order
//! (Naive, SMA, SES, Holt).

use crate::calendar::monthly_schedule;
use crate::data::timeseries::{observed, TimeSeriesPoint};
use crate::error::ModelError;
use crate::forecast::models::{
    default_candidates, FittedModel, ForecastModel, ModelKind, ModelParams, DEFAULT_SMA_WINDOW,
};
use crate::types::SkuId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default number of months to forecast
pub const DEFAULT_HORIZON: usize = 3;

/// Score of one candidate for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub model: ModelKind,
    /// In-sample RMSE, `+inf` when the candidate was excluded
    pub rmse: f64,
    pub params: Option<ModelParams>,
    /// Why the candidate was excluded
    pub error: Option<String>,
}

impl CandidateScore {
    pub fn is_excluded(&self) -> bool {
        self.error.is_some()
    }
}

/// One forecast step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Forecast from the selected model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuForecast {
    pub chosen_model: ModelKind,
    pub params: ModelParams,
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForecastOutcome {
    Available(SkuForecast),
    /// Every candidate failed to fit, or the horizon runs past the date range
    Unavailable,
}

/// Forecast and diagnostics for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub sku_id: SkuId,
    /// Number of present observations the models were fitted on
    pub observations: usize,
    pub last_observed: Option<NaiveDate>,
    /// One entry per candidate, in priority order
    pub candidates: Vec<CandidateScore>,
    pub outcome: ForecastOutcome,
}

impl ForecastResult {
    /// RMSE of a candidate (`+inf` if excluded or not evaluated)
    pub fn rmse(&self, model: ModelKind) -> f64 {
        self.candidates
            .iter()
            .find(|c| c.model == model)
            .map(|c| c.rmse)
            .unwrap_or(f64::INFINITY)
    }

    pub fn chosen_model(&self) -> Option<ModelKind> {
        match &self.outcome {
            ForecastOutcome::Available(f) => Some(f.chosen_model),
            ForecastOutcome::Unavailable => None,
        }
    }

    pub fn forecast(&self) -> Option<&SkuForecast> {
        match &self.outcome {
            ForecastOutcome::Available(f) => Some(f),
            ForecastOutcome::Unavailable => None,
        }
    }
}

/// Index of the lowest finite score; earlier entries win ties
pub fn select_best(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            continue;
        }
        match best {
            Some(b) if score >= scores[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Fits candidates per SKU and forecasts with the winner
pub struct ForecastEngine {
    candidates: Vec<Box<dyn ForecastModel>>,
    horizon: usize,
}

impl ForecastEngine {
    /// Engine with the four baseline candidates
    pub fn new(horizon: usize, sma_window: usize) -> Self {
        Self {
            candidates: default_candidates(sma_window),
            horizon,
        }
    }

    /// Engine with a custom candidate list, given in priority order
    pub fn with_candidates(horizon: usize, candidates: Vec<Box<dyn ForecastModel>>) -> Self {
        Self {
            candidates,
            horizon,
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Forecast one SKU from its time-series rows (date ordered)
    pub fn forecast_sku(&self, sku_id: &str, points: &[TimeSeriesPoint]) -> ForecastResult {
        let history = observed(points);
        let dates: Vec<NaiveDate> = history.iter().map(|(d, _)| *d).collect();
        let values: Vec<f64> = history.iter().map(|(_, v)| *v).collect();
        self.forecast_values(sku_id, &dates, &values)
    }

    /// Forecast from parallel date/value slices of present observations
    pub fn forecast_values(&self, sku_id: &str, dates: &[NaiveDate], values: &[f64]) -> ForecastResult {
        let fits: Vec<Result<FittedModel, ModelError>> =
            self.candidates.iter().map(|m| m.fit(values)).collect();

        let candidates: Vec<CandidateScore> = self
            .candidates
            .iter()
            .zip(&fits)
            .map(|(model, fit)| match fit {
                Ok(fitted) => {
                    log::debug!("SKU {} {}: RMSE {:.4}", sku_id, model.kind(), fitted.rmse);
                    CandidateScore {
                        model: model.kind(),
                        rmse: fitted.rmse,
                        params: Some(fitted.params),
                        error: None,
                    }
                }
                Err(e) => {
                    log::warn!("SKU {}: candidate excluded: {}", sku_id, e);
                    CandidateScore {
                        model: model.kind(),
                        rmse: f64::INFINITY,
                        params: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        let scores: Vec<f64> = candidates.iter().map(|c| c.rmse).collect();
        let last_observed = dates.last().copied();

        let best = select_best(&scores).and_then(|i| fits[i].as_ref().ok());

        let schedule = last_observed.and_then(|last| monthly_schedule(last, self.horizon));

        let outcome = match (best, schedule) {
            (Some(fitted), Some(dates)) => {
                let points = dates
                    .into_iter()
                    .zip(fitted.forecast(self.horizon))
                    .map(|(date, value)| ForecastPoint { date, value })
                    .collect();
                log::info!("SKU {}: best model = {}", sku_id, fitted.kind);
                ForecastOutcome::Available(SkuForecast {
                    chosen_model: fitted.kind,
                    params: fitted.params,
                    points,
                })
            }
            (Some(_), None) => {
                log::warn!(
                    "SKU {}: {} forecast months after {:?} are out of the date range, forecast unavailable",
                    sku_id,
                    self.horizon,
                    last_observed
                );
                ForecastOutcome::Unavailable
            }
            (None, _) => {
                log::warn!("SKU {}: all forecast candidates failed, forecast unavailable", sku_id);
                ForecastOutcome::Unavailable
            }
        };

        ForecastResult {
            sku_id: sku_id.to_string(),
            observations: values.len(),
            last_observed,
            candidates,
            outcome,
        }
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON, DEFAULT_SMA_WINDOW)
    }
}
