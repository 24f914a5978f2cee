//! Cumulative adoption timeline joining history and forecast.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::MonthlyPoint;
use crate::forecast::ForecastPoint;

/// Origin of a timeline point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    Historical,
    Forecast,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Historical => f.write_str("Historical"),
            Self::Forecast => f.write_str("Forecast"),
        }
    }
}

/// One point of the cumulative timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub cumulative_ev: f64,
    pub source: Source,
}

/// Builds the combined cumulative timeline.
///
/// History is summed from its first month. Forecast sums continue from the
/// final historical total using the unrounded predictions, so the series meet
/// without a gap at the join.
pub fn aggregate(history: &[MonthlyPoint], forecast: &[ForecastPoint]) -> Vec<TrendPoint> {
    let mut timeline = Vec::with_capacity(history.len() + forecast.len());
    let mut running = 0.0;

    for p in history {
        running += p.ev_total;
        timeline.push(TrendPoint {
            date: p.date,
            cumulative_ev: running,
            source: Source::Historical,
        });
    }
    for p in forecast {
        running += p.raw;
        timeline.push(TrendPoint {
            date: p.date,
            cumulative_ev: running,
            source: Source::Forecast,
        });
    }

    timeline
}

/// Direction of the forecast change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
    Flat,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increase => f.write_str("increase"),
            Self::Decrease => f.write_str("decrease"),
            Self::Flat => f.write_str("no change"),
        }
    }
}

/// Overall change from the end of history to the end of the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Growth {
    /// Cumulative total at the last historical month.
    pub historical_total: f64,
    /// Cumulative total at the last forecast month.
    pub forecast_total: f64,
    /// Percentage change; `None` when the historical total is zero.
    pub pct: Option<f64>,
}

impl Growth {
    /// Summarizes a timeline produced by [`aggregate`].
    pub fn from_timeline(timeline: &[TrendPoint]) -> Self {
        let historical_total = timeline
            .iter()
            .rev()
            .find(|p| p.source == Source::Historical)
            .map_or(0.0, |p| p.cumulative_ev);
        let forecast_total = timeline
            .last()
            .filter(|p| p.source == Source::Forecast)
            .map_or(historical_total, |p| p.cumulative_ev);
        Self::new(historical_total, forecast_total)
    }

    /// Builds the summary from the two totals.
    pub fn new(historical_total: f64, forecast_total: f64) -> Self {
        let pct = (historical_total != 0.0)
            .then(|| (forecast_total - historical_total) / historical_total * 100.0);
        Self {
            historical_total,
            forecast_total,
            pct,
        }
    }

    /// Direction of change, when the percentage is defined.
    pub fn direction(&self) -> Option<Direction> {
        self.pct.map(|pct| {
            if pct > 0.0 {
                Direction::Increase
            } else if pct < 0.0 {
                Direction::Decrease
            } else {
                Direction::Flat
            }
        })
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.pct, self.direction()) {
            (Some(pct), Some(direction)) => write!(f, "{direction} of {pct:.2}%"),
            _ => f.write_str("no historical data to compare against"),
        }
    }
}
