//! Autoregressive monthly forecast.
//!
//! Each month's prediction is pushed back into the rolling windows and feeds
//! the features of the following month, so steps run strictly in order.

use chrono::{Months, NaiveDate};
use serde::Serialize;
use tracing::{debug, trace};

use crate::dataset::CountySeries;
use crate::error::{ForecastError, Result};
use crate::features::{FeatureVector, MIN_LAGS, WINDOW_DEPTH, Window};
use crate::model::Predictor;

/// Default forecast horizon in months.
pub const DEFAULT_HORIZON_MONTHS: u32 = 36;

/// One forecast month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Forecast month (same day-of-month as the last observation, clamped).
    pub date: NaiveDate,
    /// Prediction rounded for display.
    pub predicted_total: i64,
    /// Unrounded prediction, as fed back into the windows.
    #[serde(skip)]
    pub raw: f64,
}

/// Lazy, single-pass iterator over forecast months for one county.
///
/// Yields `horizon` points unless the predictor fails, in which case the
/// error is yielded once and iteration ends.
pub struct ForecastStepper<'a, P: Predictor + ?Sized> {
    predictor: &'a P,
    base_date: NaiveDate,
    county_code: i64,
    months_since_start: i64,
    rolling: Window,
    cumulative: Window,
    step: u32,
    horizon: u32,
    failed: bool,
}

impl<'a, P: Predictor + ?Sized> ForecastStepper<'a, P> {
    /// Seeds the windows from the last [`WINDOW_DEPTH`] months of `series`.
    ///
    /// The cumulative window starts as the running sum of those months only.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InsufficientHistory`] when the county has
    /// fewer than [`MIN_LAGS`] observations.
    pub fn new(series: &CountySeries, predictor: &'a P, horizon: u32) -> Result<Self> {
        let base_date = match series.last_date() {
            Some(date) if series.len() >= MIN_LAGS => date,
            _ => {
                return Err(ForecastError::InsufficientHistory {
                    county: series.name.clone(),
                    required: MIN_LAGS,
                    found: series.len(),
                });
            }
        };

        let totals = series.totals();
        let tail = &totals[totals.len().saturating_sub(WINDOW_DEPTH)..];
        let rolling = Window::from_tail(tail);
        let mut cumulative = Window::new();
        let mut running = 0.0;
        for &v in tail {
            running += v;
            cumulative.push(running);
        }

        debug!(
            county = %series.name,
            code = series.code,
            %base_date,
            horizon,
            "forecast seeded"
        );

        Ok(Self {
            predictor,
            base_date,
            county_code: series.code,
            months_since_start: series.months_since_start,
            rolling,
            cumulative,
            step: 0,
            horizon,
            failed: false,
        })
    }

    /// Current rolling window of monthly totals.
    pub fn rolling(&self) -> &Window {
        &self.rolling
    }

    /// Current window of cumulative totals.
    pub fn cumulative(&self) -> &Window {
        &self.cumulative
    }

    fn advance(&mut self) -> Result<ForecastPoint> {
        let date = self
            .base_date
            .checked_add_months(Months::new(self.step))
            .ok_or(ForecastError::DateOutOfRange {
                base: self.base_date,
                months: self.step,
            })?;
        self.months_since_start += 1;

        let features = FeatureVector::build(
            &self.rolling,
            &self.cumulative,
            self.months_since_start,
            self.county_code,
        )?;
        let raw = self.predictor.predict(&features)?;
        trace!(%date, ?features, raw, "forecast step");

        let last_cumulative = self.cumulative.last().unwrap_or(0.0);
        self.rolling.push(raw);
        self.cumulative.push(last_cumulative + raw);

        Ok(ForecastPoint {
            date,
            predicted_total: raw.round_ties_even() as i64,
            raw,
        })
    }
}

impl<P: Predictor + ?Sized> Iterator for ForecastStepper<'_, P> {
    type Item = Result<ForecastPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.step >= self.horizon {
            return None;
        }
        self.step += 1;
        let result = self.advance();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = (self.horizon - self.step) as usize;
        (0, Some(remaining))
    }
}

/// Runs the full forecast for one county.
///
/// # Errors
///
/// Returns the first error from seeding or from any step.
pub fn forecast_county<P: Predictor + ?Sized>(
    series: &CountySeries,
    predictor: &P,
    horizon: u32,
) -> Result<Vec<ForecastPoint>> {
    ForecastStepper::new(series, predictor, horizon)?.collect()
}
