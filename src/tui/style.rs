//! Color constants and chart scaling helpers for the TUI.

use chrono::{Datelike, NaiveDate};
use ratatui::style::Color;

/// Line colors for up to three compared counties; wraps beyond that.
pub const COUNTY_COLORS: [Color; 3] = [Color::Cyan, Color::Yellow, Color::Magenta];
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Marked county in the selector.
pub const MARKED: Color = Color::Green;
/// Warning text.
pub const WARNING: Color = Color::Red;

/// Chart color for the `idx`-th displayed county.
pub fn county_color(idx: usize) -> Color {
    COUNTY_COLORS[idx % COUNTY_COLORS.len()]
}

/// Month index used as the chart's x coordinate.
pub fn month_x(date: NaiveDate) -> f64 {
    f64::from(date.year() * 12 + date.month0() as i32)
}

/// Inverse of [`month_x`], formatted as `YYYY-MM`.
pub fn month_label(x: f64) -> String {
    let idx = x.round() as i64;
    format!("{}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1)
}

/// Computes Y-axis bounds over all series with 10% padding.
pub fn auto_bounds_y(series: &[&[(f64, f64)]]) -> [f64; 2] {
    let all = series.iter().flat_map(|s| s.iter()).map(|&(_, y)| y);
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let range = (max - min).max(1.0);
    let pad = range * 0.1;
    [(min - pad).max(0.0), max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_label_inverts_month_x() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(month_label(month_x(d)), "2024-02");
        let dec = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
        assert_eq!(month_label(month_x(dec)), "2019-12");
    }

    #[test]
    fn bounds_cover_all_series() {
        let a = [(0.0, 10.0), (1.0, 20.0)];
        let b = [(0.0, 50.0)];
        let [lo, hi] = auto_bounds_y(&[&a, &b]);
        assert!(lo <= 10.0);
        assert!(hi >= 50.0);
        assert_eq!(auto_bounds_y(&[]), [0.0, 1.0]);
    }
}
