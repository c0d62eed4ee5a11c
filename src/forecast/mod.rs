//! Per-SKU demand forecasting with automatic model selection

pub mod engine;
pub mod models;
pub mod optimize;

pub use engine::{
    select_best, CandidateScore, ForecastEngine, ForecastOutcome, ForecastPoint, ForecastResult,
    SkuForecast, DEFAULT_HORIZON,
};
pub use models::{
    default_candidates, rmse, FittedModel, ForecastModel, HoltLinear, ModelKind, ModelParams,
    Naive, SimpleExpSmoothing, SimpleMovingAverage, DEFAULT_SMA_WINDOW,
};
