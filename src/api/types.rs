//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::context::CountyForecast;
use crate::forecast::ForecastPoint;
use crate::trend::{Direction, Growth, TrendPoint};

/// Query for the single-county endpoint.
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// County name (case-insensitive).
    pub county: Option<String>,
}

/// Query for the comparison endpoint.
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    /// Comma-separated county names.
    pub counties: Option<String>,
}

impl CompareQuery {
    /// Splits the comma-separated list, dropping blank entries.
    pub fn names(&self) -> Vec<&str> {
        self.counties
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Growth summary as exposed over the API.
#[derive(Debug, Serialize)]
pub struct GrowthRecord {
    /// Cumulative EVs at the end of history.
    pub historical_total: f64,
    /// Cumulative EVs at the end of the forecast.
    pub forecast_total: f64,
    /// Percentage change, `null` when history sums to zero.
    pub growth_pct: Option<f64>,
    /// `increase`, `decrease`, or `flat`; `null` with `growth_pct`.
    pub direction: Option<Direction>,
}

impl From<&Growth> for GrowthRecord {
    fn from(g: &Growth) -> Self {
        Self {
            historical_total: g.historical_total,
            forecast_total: g.forecast_total,
            growth_pct: g.pct,
            direction: g.direction(),
        }
    }
}

/// One county's forecast, trend, and growth.
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub county: String,
    pub horizon_months: usize,
    pub forecast: Vec<ForecastPoint>,
    pub trend: Vec<TrendPoint>,
    pub growth: GrowthRecord,
}

impl From<CountyForecast> for ForecastResponse {
    fn from(r: CountyForecast) -> Self {
        Self {
            horizon_months: r.forecast.len(),
            growth: GrowthRecord::from(&r.growth),
            county: r.county,
            forecast: r.forecast,
            trend: r.trend,
        }
    }
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
