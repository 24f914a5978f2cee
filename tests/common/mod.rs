//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{Months, NaiveDate};

use ev_forecast::context::ForecastContext;
use ev_forecast::dataset::{CountySeries, Dataset, MonthlyPoint};
use ev_forecast::features::FeatureVector;
use ev_forecast::model::Predictor;

/// Predictor that always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct ConstantPredictor(pub f64);

impl Predictor for ConstantPredictor {
    fn predict(&self, _: &FeatureVector) -> ev_forecast::error::Result<f64> {
        Ok(self.0)
    }
}

/// Month-end series for `name` with consecutive monthly `values` ending at `last`.
pub fn series_ending(name: &str, code: i64, last: NaiveDate, values: &[f64]) -> CountySeries {
    let n = values.len() as u32;
    let points = values
        .iter()
        .enumerate()
        .filter_map(|(i, &ev_total)| {
            let back = n - 1 - i as u32;
            Some(MonthlyPoint {
                date: last.checked_sub_months(Months::new(back))?,
                ev_total,
            })
        })
        .collect();
    CountySeries::new(name, code, i64::from(n) + 30, points)
}

/// King County with the six-month history `[10, 12, 15, 14, 18, 20]`
/// ending 2023-06-30.
pub fn king() -> CountySeries {
    series_ending(
        "King",
        0,
        NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
        &[10.0, 12.0, 15.0, 14.0, 18.0, 20.0],
    )
}

/// Four-county dataset: King, a county whose history sums to 100, one with
/// zero history, and one too short to forecast.
pub fn dataset() -> Dataset {
    let last = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
    Dataset::from_series([
        king(),
        series_ending("Pierce", 1, last, &[10.0, 20.0, 30.0, 40.0]),
        series_ending("Garfield", 2, last, &[0.0, 0.0, 0.0]),
        series_ending("Wahkiakum", 3, last, &[1.0, 2.0]),
    ])
}

/// Context over [`dataset`] with a constant predictor of 5.
pub fn context(horizon: u32) -> ForecastContext<ConstantPredictor> {
    ForecastContext::new(dataset(), ConstantPredictor(5.0), horizon, 3)
}
