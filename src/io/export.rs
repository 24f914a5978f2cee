//! CSV export for forecasts and cumulative trends.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::forecast::ForecastPoint;
use crate::trend::TrendPoint;

/// Column header for trend export.
const TREND_HEADER: [&str; 3] = ["date", "cumulative_ev", "source"];

/// Column header for forecast export.
const FORECAST_HEADER: [&str; 2] = ["date", "predicted_ev_total"];

/// Exports a cumulative trend to a CSV file at the given path.
///
/// # Arguments
///
/// * `trend` - Combined historical and forecast timeline
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_trend_csv(trend: &[TrendPoint], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_trend_csv(trend, io::BufWriter::new(file))
}

/// Writes a cumulative trend as CSV to any writer.
///
/// Cumulative values are written with two decimals; output is deterministic
/// for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_trend_csv(trend: &[TrendPoint], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TREND_HEADER)?;
    for p in trend {
        wtr.write_record(&[
            p.date.to_string(),
            format!("{:.2}", p.cumulative_ev),
            p.source.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports forecast points to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_forecast_csv(forecast: &[ForecastPoint], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_forecast_csv(forecast, io::BufWriter::new(file))
}

/// Writes rounded forecast points as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_forecast_csv(forecast: &[ForecastPoint], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(FORECAST_HEADER)?;
    for p in forecast {
        wtr.write_record(&[p.date.to_string(), p.predicted_total.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
