//! Forecast service: the collaborator boundary around the engine.
//!
//! Fetches history from a [`MarketSource`], trains, persists through a
//! [`ModelStore`] and serves predictions from stored models. Training the same
//! symbol twice at once is serialized by a per-symbol lock; different symbols
//! train independently, and readers never wait on a retrain.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use predictor::extract::{covering_month, covering_week};
use predictor::{Forecast, Model, PredictorError, SuggestionWeights, TrainConfig, suggest, train};
use storage::{MarketSource, ModelStore, StoreError, normalize_symbol};
use thiserror::Error;
use tracing::{debug, info};
use types::{Accuracy, Label, PeriodRecord, Suggestion};

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no trained model for symbol {0}")]
    ModelNotFound(String),

    #[error(transparent)]
    Predictor(#[from] PredictorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ForecastService<S, M> {
    store: S,
    market: M,
    config: TrainConfig,
    weights: SuggestionWeights,
    /// One training lock per symbol, created on first use.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: ModelStore, M: MarketSource> ForecastService<S, M> {
    pub fn new(store: S, market: M, config: TrainConfig, weights: SuggestionWeights) -> Self {
        Self {
            store,
            market,
            config,
            weights,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn symbol_lock(&self, symbol: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(symbol.to_string())
            .or_default()
            .clone()
    }

    /// Train from the symbol's full history and replace its stored model.
    pub fn train(&self, symbol: &str) -> Result<Arc<Model>> {
        let symbol = normalize_symbol(symbol)?;
        let lock = self.symbol_lock(&symbol);
        let _guard = lock.lock();

        info!(%symbol, "Training model");
        let history = self.market.history(&symbol)?;
        let model = train(&history, &self.config)?;
        self.store.put(&symbol, &model)?;
        info!(%symbol, built_at = %model.built_at, "Model stored");

        Ok(Arc::new(model))
    }

    /// Stored model, or `ModelNotFound`.
    pub fn model(&self, symbol: &str) -> Result<Arc<Model>> {
        self.store
            .get(symbol)?
            .ok_or_else(|| ServiceError::ModelNotFound(symbol.to_string()))
    }

    pub fn forecast(
        &self,
        symbol: &str,
        day: &PeriodRecord,
        week: &PeriodRecord,
        month: &PeriodRecord,
    ) -> Result<Forecast> {
        let model = self.model(symbol)?;
        Ok(model.forecast_with(day, week, month, &self.weights)?)
    }

    /// Forecast from a daily record in the market source: the one stamped
    /// `date`, or the newest when `date` is `None`.
    pub fn forecast_from_source(
        &self,
        symbol: &str,
        date: Option<NaiveDate>,
    ) -> Result<(PeriodRecord, Forecast)> {
        let model = self.model(symbol)?;
        let history = self.market.history(symbol)?;

        let day = match date {
            Some(date) => history.days.iter().find(|d| d.timestamp == date),
            None => history.days.first(),
        }
        .ok_or_else(|| {
            PredictorError::MalformedSeries(match date {
                Some(date) => format!("no daily record for {date}"),
                None => "no daily records".to_string(),
            })
        })?;

        let week = covering_week(&history.weeks, day.timestamp);
        let month = covering_month(&history.months, day.timestamp);
        let (Some(week), Some(month)) = (week, month) else {
            return Err(PredictorError::MalformedSeries(format!(
                "{} has no covering week and month",
                day.timestamp
            ))
            .into());
        };

        debug!(
            %symbol,
            day = %day.timestamp,
            week = %week.timestamp,
            month = %month.timestamp,
            "Forecasting"
        );
        let forecast = model.forecast_with(day, week, month, &self.weights)?;
        Ok((*day, forecast))
    }

    /// Re-score the stored model's validation samples.
    pub fn validate(&self, symbol: &str) -> Result<Accuracy> {
        Ok(self.model(symbol)?.validate())
    }

    /// Re-score the stored model's test samples.
    pub fn test(&self, symbol: &str) -> Result<Accuracy> {
        Ok(self.model(symbol)?.test())
    }

    pub fn suggest(&self, label: &Label) -> Suggestion {
        suggest(label, &self.weights)
    }
}
