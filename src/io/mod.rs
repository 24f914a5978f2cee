//! File output helpers.

/// CSV export of forecasts and trends.
pub mod export;
