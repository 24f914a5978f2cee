//! Plain-text forecast summaries for the terminal.

use std::io::{self, Write};

use crate::context::CountyForecast;

/// Writes the forecast table and growth summary for one county.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_forecast_report<W: Write>(w: &mut W, result: &CountyForecast) -> io::Result<()> {
    writeln!(w, "--- {} County ({} months) ---", result.county, result.forecast.len())?;
    writeln!(w, "{:<12} {:>12}", "date", "predicted")?;
    for p in &result.forecast {
        writeln!(w, "{:<12} {:>12}", p.date, p.predicted_total)?;
    }
    writeln!(w)?;
    write_growth_line(w, result)
}

/// Writes one growth line per county for a comparison run.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_comparison_report<W: Write>(w: &mut W, results: &[CountyForecast]) -> io::Result<()> {
    let names: Vec<&str> = results.iter().map(|r| r.county.as_str()).collect();
    writeln!(w, "--- Comparison: {} ---", names.join(", "))?;
    for result in results {
        write_growth_line(w, result)?;
    }
    Ok(())
}

fn write_growth_line<W: Write>(w: &mut W, result: &CountyForecast) -> io::Result<()> {
    let g = &result.growth;
    match g.pct {
        Some(_) => writeln!(
            w,
            "{}: cumulative EVs {:.0} -> {:.0}, {} over {} months",
            result.county,
            g.historical_total,
            g.forecast_total,
            g,
            result.forecast.len()
        ),
        None => writeln!(
            w,
            "{}: historical EV total is zero, percentage change not available",
            result.county
        ),
    }
}
