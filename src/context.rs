//! Immutable forecasting context: dataset and model loaded once, then shared.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::dataset::{CountySeries, Dataset, MonthlyPoint};
use crate::error::{ForecastError, Result};
use crate::forecast::{ForecastPoint, forecast_county};
use crate::model::{Model, Predictor};
use crate::trend::{Growth, TrendPoint, aggregate};

/// Complete result for one county.
#[derive(Debug, Clone, Serialize)]
pub struct CountyForecast {
    /// County name as stored in the dataset.
    pub county: String,
    /// Encoded county id.
    pub code: i64,
    /// Forecast months.
    pub forecast: Vec<ForecastPoint>,
    /// Cumulative history followed by cumulative forecast.
    pub trend: Vec<TrendPoint>,
    /// Change from the end of history to the end of the forecast.
    pub growth: Growth,
}

impl CountyForecast {
    /// Runs the forecast for `series` and assembles the trend and growth summary.
    ///
    /// # Errors
    ///
    /// Propagates seeding and predictor errors from the forecast.
    pub fn compute<P: Predictor + ?Sized>(
        series: &CountySeries,
        predictor: &P,
        horizon: u32,
    ) -> Result<Self> {
        let forecast = forecast_county(series, predictor, horizon)?;
        let trend = aggregate(&series.points, &forecast);
        let growth = Growth::from_timeline(&trend);
        Ok(Self {
            county: series.name.clone(),
            code: series.code,
            forecast,
            trend,
            growth,
        })
    }

    /// Historical observations the forecast was seeded from.
    pub fn history_len(&self) -> usize {
        self.trend.len() - self.forecast.len()
    }
}

/// Dataset, model and forecast settings, fixed after [`ForecastContext::init`].
#[derive(Debug)]
pub struct ForecastContext<P = Model> {
    dataset: Dataset,
    model: P,
    horizon: u32,
    max_compare: usize,
}

impl ForecastContext<Model> {
    /// Loads the dataset and model described by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns dataset or model load errors.
    pub fn init(cfg: &AppConfig) -> Result<Self> {
        let dataset = match &cfg.data.path {
            Some(path) => Dataset::from_csv_path(path)?,
            None => {
                info!(
                    seed = cfg.data.demo_seed,
                    counties = cfg.data.demo_counties,
                    "no data path configured, using synthetic dataset"
                );
                Dataset::demo(cfg.data.demo_seed, cfg.data.demo_counties)
            }
        };
        let model = Model::load(&cfg.model)?;
        Ok(Self::new(
            dataset,
            model,
            cfg.forecast.horizon_months,
            cfg.forecast.max_compare,
        ))
    }
}

impl<P: Predictor> ForecastContext<P> {
    /// Assembles a context from already loaded parts.
    pub fn new(dataset: Dataset, model: P, horizon: u32, max_compare: usize) -> Self {
        Self {
            dataset,
            model,
            horizon,
            max_compare,
        }
    }

    /// Sorted county names.
    pub fn counties(&self) -> Vec<&str> {
        self.dataset.county_names()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn model(&self) -> &P {
        &self.model
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn max_compare(&self) -> usize {
        self.max_compare
    }

    /// Historical observations for a county.
    ///
    /// # Errors
    ///
    /// See [`ForecastContext::forecast`].
    pub fn history(&self, county: &str) -> Result<&[MonthlyPoint]> {
        Ok(&self.series(county)?.points)
    }

    /// Forecasts a single county.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::NoCountySelected`] for a blank name,
    /// [`ForecastError::UnknownCounty`] if it is not in the dataset, or any
    /// forecast error.
    pub fn forecast(&self, county: &str) -> Result<CountyForecast> {
        let series = self.series(county)?;
        let result = CountyForecast::compute(series, &self.model, self.horizon)?;
        info!(
            county = %result.county,
            months = result.forecast.len(),
            growth_pct = ?result.growth.pct,
            "forecast complete"
        );
        Ok(result)
    }

    /// Forecasts up to `max_compare` distinct counties.
    ///
    /// The whole request fails if any selection is invalid; no partial
    /// results are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::NoCountySelected`],
    /// [`ForecastError::TooManyCounties`], [`ForecastError::DuplicateCounty`],
    /// [`ForecastError::UnknownCounty`], or any forecast error.
    pub fn compare<S: AsRef<str>>(&self, counties: &[S]) -> Result<Vec<CountyForecast>> {
        if counties.is_empty() {
            return Err(ForecastError::NoCountySelected);
        }
        if counties.len() > self.max_compare {
            return Err(ForecastError::TooManyCounties {
                max: self.max_compare,
                requested: counties.len(),
            });
        }

        let mut selected: Vec<&CountySeries> = Vec::with_capacity(counties.len());
        for name in counties {
            let series = self.series(name.as_ref())?;
            if selected.iter().any(|s| s.name == series.name) {
                return Err(ForecastError::DuplicateCounty(series.name.clone()));
            }
            selected.push(series);
        }

        selected
            .into_iter()
            .map(|series| CountyForecast::compute(series, &self.model, self.horizon))
            .collect()
    }

    fn series(&self, county: &str) -> Result<&CountySeries> {
        if county.trim().is_empty() {
            warn!("forecast requested without a county");
            return Err(ForecastError::NoCountySelected);
        }
        self.dataset.get(county).ok_or_else(|| {
            warn!(county, "unknown county requested");
            ForecastError::UnknownCounty(county.trim().to_string())
        })
    }
}
