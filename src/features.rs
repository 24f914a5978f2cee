//! Model input features derived from the recent monthly totals.

use std::collections::VecDeque;

use serde::Serialize;

use crate::error::{ForecastError, Result};

/// Number of values retained by the rolling and cumulative windows.
pub const WINDOW_DEPTH: usize = 6;

/// Minimum number of rolling values needed to derive the three lag features.
pub const MIN_LAGS: usize = 3;

/// Column names in the order the model was trained on.
pub const FEATURE_NAMES: [&str; 9] = [
    "months_since_start",
    "county_encoded",
    "ev_total_lag1",
    "ev_total_lag2",
    "ev_total_lag3",
    "ev_total_roll_mean_3",
    "ev_total_pct_change_1",
    "ev_total_pct_change_3",
    "ev_growth_slope",
];

/// Bounded FIFO of recent values; pushing past [`WINDOW_DEPTH`] evicts the oldest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Window {
    values: VecDeque<f64>,
}

impl Window {
    /// Creates an empty window.
    pub fn new() -> Self {
        Self {
            values: VecDeque::with_capacity(WINDOW_DEPTH + 1),
        }
    }

    /// Builds a window from the tail of `values`, keeping at most [`WINDOW_DEPTH`].
    pub fn from_tail(values: &[f64]) -> Self {
        let mut window = Self::new();
        for &v in values {
            window.push(v);
        }
        window
    }

    /// Appends a value, evicting the oldest entry when over capacity.
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > WINDOW_DEPTH {
            self.values.pop_front();
        }
    }

    /// Number of values currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no values are held.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent value, if any.
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Value `n` steps back from the newest (`0` is the newest).
    pub fn nth_back(&self, n: usize) -> Option<f64> {
        self.values.iter().rev().nth(n).copied()
    }

    /// Values oldest to newest.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}

/// One row of model input, in the fixed training column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub months_since_start: f64,
    pub county_encoded: f64,
    pub ev_total_lag1: f64,
    pub ev_total_lag2: f64,
    pub ev_total_lag3: f64,
    pub ev_total_roll_mean_3: f64,
    pub ev_total_pct_change_1: f64,
    pub ev_total_pct_change_3: f64,
    pub ev_growth_slope: f64,
}

impl FeatureVector {
    /// Derives the features for the next month from the current windows.
    ///
    /// # Arguments
    ///
    /// * `rolling` - Recent monthly totals, actual then predicted
    /// * `cumulative` - Recent cumulative totals
    /// * `months_since_start` - Month counter for the month being predicted
    /// * `county_code` - Encoded county id
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InsufficientHistory`] when `rolling` holds
    /// fewer than [`MIN_LAGS`] values.
    pub fn build(
        rolling: &Window,
        cumulative: &Window,
        months_since_start: i64,
        county_code: i64,
    ) -> Result<Self> {
        let (Some(lag1), Some(lag2), Some(lag3)) =
            (rolling.nth_back(0), rolling.nth_back(1), rolling.nth_back(2))
        else {
            return Err(ForecastError::InsufficientHistory {
                county: format!("code {county_code}"),
                required: MIN_LAGS,
                found: rolling.len(),
            });
        };

        Ok(Self {
            months_since_start: months_since_start as f64,
            county_encoded: county_code as f64,
            ev_total_lag1: lag1,
            ev_total_lag2: lag2,
            ev_total_lag3: lag3,
            ev_total_roll_mean_3: (lag1 + lag2 + lag3) / 3.0,
            ev_total_pct_change_1: pct_change(lag1, lag2),
            ev_total_pct_change_3: pct_change(lag1, lag3),
            ev_growth_slope: growth_slope(cumulative),
        })
    }

    /// Feature values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; 9] {
        [
            self.months_since_start,
            self.county_encoded,
            self.ev_total_lag1,
            self.ev_total_lag2,
            self.ev_total_lag3,
            self.ev_total_roll_mean_3,
            self.ev_total_pct_change_1,
            self.ev_total_pct_change_3,
            self.ev_growth_slope,
        ]
    }
}

/// Relative change from `base` to `current`; 0 when `base` is zero.
fn pct_change(current: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (current - base) / base
    }
}

/// Least-squares slope of a full window against indices `0..WINDOW_DEPTH`.
///
/// Returns 0 unless the window holds exactly [`WINDOW_DEPTH`] values.
pub fn growth_slope(cumulative: &Window) -> f64 {
    if cumulative.len() != WINDOW_DEPTH {
        return 0.0;
    }

    let n = WINDOW_DEPTH as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = cumulative.values.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in cumulative.values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    num / den
}
