//! County-level monthly EV registration data.
//!
//! Loads the preprocessed state export from CSV, or builds a seeded synthetic
//! dataset for demos and tests.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ForecastError, Result};

/// Counties used by the synthetic demo dataset.
const DEMO_COUNTIES: &[&str] = &[
    "King",
    "Snohomish",
    "Pierce",
    "Clark",
    "Thurston",
    "Kitsap",
    "Spokane",
    "Whatcom",
    "Benton",
    "Skagit",
    "Island",
    "Garfield",
];

/// Number of monthly observations generated per demo county.
const DEMO_MONTHS: u32 = 86;

/// One month of registrations for a county.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// Observation date (month end in the state export).
    pub date: NaiveDate,
    /// EV registrations reported for the month.
    pub ev_total: f64,
}

/// Chronologically sorted monthly history for one county.
#[derive(Debug, Clone, PartialEq)]
pub struct CountySeries {
    /// County name as it appears in the dataset.
    pub name: String,
    /// Label-encoded county id fed to the model.
    pub code: i64,
    /// Month counter of the latest observation.
    pub months_since_start: i64,
    /// Monthly observations, oldest first.
    pub points: Vec<MonthlyPoint>,
}

impl CountySeries {
    /// Builds a series from unsorted points, sorting them by date.
    pub fn new(
        name: impl Into<String>,
        code: i64,
        months_since_start: i64,
        mut points: Vec<MonthlyPoint>,
    ) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            name: name.into(),
            code,
            months_since_start,
            points,
        }
    }

    /// Monthly totals, oldest first.
    pub fn totals(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.ev_total).collect()
    }

    /// Date of the latest observation.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Row layout of the preprocessed CSV. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "County", default)]
    county: String,
    #[serde(rename = "Electric Vehicle (EV) Total")]
    ev_total: String,
    #[serde(default)]
    county_encoded: Option<i64>,
    #[serde(default)]
    months_since_start: Option<i64>,
}

/// In-memory dataset keyed by county name.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    counties: BTreeMap<String, CountySeries>,
}

impl Dataset {
    /// Builds a dataset from already assembled series.
    pub fn from_series(series: impl IntoIterator<Item = CountySeries>) -> Self {
        let counties = series.into_iter().map(|s| (s.name.clone(), s)).collect();
        Self { counties }
    }

    /// Loads the dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Io`] if the file cannot be opened, or any
    /// error from [`Dataset::from_reader`].
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ForecastError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            counties = dataset.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Parses CSV rows from any reader.
    ///
    /// Rows for the same county and date are summed. When `county_encoded` is
    /// missing, counties are coded by their sorted position; when
    /// `months_since_start` is missing it is counted from the earliest date
    /// in the file.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidRecord`] for unparseable dates or
    /// counts and [`ForecastError::EmptyDataset`] if no rows remain.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        struct Acc {
            code: Option<i64>,
            months: Option<i64>,
            by_date: BTreeMap<NaiveDate, f64>,
        }

        let mut acc: BTreeMap<String, Acc> = BTreeMap::new();
        for (idx, record) in rdr.deserialize::<RawRecord>().enumerate() {
            // Header is line 1.
            let row = idx + 2;
            let record = record?;
            if record.county.is_empty() {
                warn!(row, "skipping row without county");
                continue;
            }

            let date = parse_date(&record.date).ok_or_else(|| ForecastError::InvalidRecord {
                row,
                message: format!("unrecognised date \"{}\"", record.date),
            })?;
            let ev_total = parse_count(&record.ev_total).ok_or_else(|| {
                ForecastError::InvalidRecord {
                    row,
                    message: format!("invalid EV total \"{}\"", record.ev_total),
                }
            })?;

            let entry = acc.entry(record.county).or_insert_with(|| Acc {
                code: None,
                months: None,
                by_date: BTreeMap::new(),
            });
            if record.county_encoded.is_some() {
                entry.code = record.county_encoded;
            }
            if let Some(m) = record.months_since_start {
                entry.months = Some(entry.months.map_or(m, |cur| cur.max(m)));
            }
            *entry.by_date.entry(date).or_insert(0.0) += ev_total;
        }

        if acc.is_empty() {
            return Err(ForecastError::EmptyDataset);
        }

        let origin = acc
            .values()
            .filter_map(|a| a.by_date.keys().next().copied())
            .min()
            .ok_or(ForecastError::EmptyDataset)?;

        let counties = acc
            .into_iter()
            .enumerate()
            .map(|(position, (name, a))| {
                let last = a.by_date.keys().next_back().copied().unwrap_or(origin);
                let months = a.months.unwrap_or_else(|| month_distance(origin, last));
                let code = a.code.unwrap_or(position as i64);
                let points = a
                    .by_date
                    .into_iter()
                    .map(|(date, ev_total)| MonthlyPoint { date, ev_total })
                    .collect();
                debug!(county = %name, code, months_since_start = months, "county series built");
                let series = CountySeries::new(name.clone(), code, months, points);
                (name, series)
            })
            .collect();

        Ok(Self { counties })
    }

    /// Builds a reproducible synthetic dataset of `count` counties.
    ///
    /// Each county follows noisy exponential growth over month-end dates
    /// starting January 2017. The same `seed` always yields the same data.
    pub fn demo(seed: u64, count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = NaiveDate::from_ymd_opt(2017, 1, 31).unwrap_or_default();

        let mut names: Vec<&str> = DEMO_COUNTIES
            .iter()
            .copied()
            .take(count.clamp(1, DEMO_COUNTIES.len()))
            .collect();
        names.sort_unstable();

        let series = names.into_iter().enumerate().map(|(code, name)| {
            let base: f64 = rng.random_range(5.0..60.0);
            let growth: f64 = rng.random_range(0.01..0.035);
            let points = (0..DEMO_MONTHS)
                .filter_map(|m| {
                    let date = start.checked_add_months(Months::new(m))?;
                    let noise: f64 = rng.random_range(-0.15..0.15);
                    let level = base * (1.0 + growth).powi(m as i32) * (1.0 + noise);
                    Some(MonthlyPoint {
                        date,
                        ev_total: level.round().max(0.0),
                    })
                })
                .collect();
            CountySeries::new(name, code as i64, i64::from(DEMO_MONTHS) - 1, points)
        });

        Self::from_series(series)
    }

    /// Looks up a county by name, ignoring surrounding whitespace and,
    /// failing an exact match, letter case.
    pub fn get(&self, name: &str) -> Option<&CountySeries> {
        let name = name.trim();
        self.counties.get(name).or_else(|| {
            self.counties
                .values()
                .find(|s| s.name.eq_ignore_ascii_case(name))
        })
    }

    /// County names in sorted order.
    pub fn county_names(&self) -> Vec<&str> {
        self.counties.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }
}

/// Parses the date formats seen in state exports.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%B %d %Y"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .ok()
}

/// Parses a non-negative count, tolerating thousands separators.
fn parse_count(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let value = cleaned.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Whole calendar months from `from` to `to`.
fn month_distance(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,County,State,Electric Vehicle (EV) Total,county_encoded,months_since_start
2017-01-31,Adams,WA,1,0,0
2017-02-28,Adams,WA,2,0,1
2017-03-31,Adams,WA,\"1,204\",0,2
2017-02-28,Benton,WA,7,1,1
2017-01-31,Benton,WA,5,1,0
,,WA,9,,
";

    #[test]
    fn parses_and_sorts_series() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.county_names(), vec!["Adams", "Benton"]);

        let benton = ds.get("Benton").unwrap();
        assert_eq!(benton.code, 1);
        assert_eq!(benton.months_since_start, 1);
        assert_eq!(benton.totals(), vec![5.0, 7.0]);
        assert_eq!(
            benton.last_date(),
            NaiveDate::from_ymd_opt(2017, 2, 28)
        );

        let adams = ds.get("Adams").unwrap();
        assert_eq!(adams.totals(), vec![1.0, 2.0, 1204.0]);
    }

    #[test]
    fn lookup_trims_and_ignores_case() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(ds.get("  adams ").is_some());
        assert!(ds.get("Yakima").is_none());
    }

    #[test]
    fn derives_missing_codes_and_month_counters() {
        let csv = "\
Date,County,Electric Vehicle (EV) Total
January 31 2018,Walla Walla,3
February 28 2018,Walla Walla,4
2018-03-31,Asotin,2
";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        let asotin = ds.get("Asotin").unwrap();
        let walla = ds.get("Walla Walla").unwrap();
        assert_eq!(asotin.code, 0);
        assert_eq!(walla.code, 1);
        assert_eq!(walla.months_since_start, 1);
        assert_eq!(asotin.months_since_start, 2);
    }

    #[test]
    fn duplicate_dates_are_summed() {
        let csv = "\
Date,County,Electric Vehicle (EV) Total,county_encoded
2020-05-31,Lewis,4,3
2020-05-31,Lewis,6,3
";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.get("Lewis").unwrap().totals(), vec![10.0]);
    }

    #[test]
    fn rejects_bad_rows() {
        let bad_date = "Date,County,Electric Vehicle (EV) Total\nyesterday,King,4\n";
        let err = Dataset::from_reader(bad_date.as_bytes()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRecord { row: 2, .. }));

        let negative = "Date,County,Electric Vehicle (EV) Total\n2020-01-31,King,-4\n";
        assert!(Dataset::from_reader(negative.as_bytes()).is_err());
    }

    #[test]
    fn empty_input_is_an_error() {
        let header_only = "Date,County,Electric Vehicle (EV) Total\n";
        let err = Dataset::from_reader(header_only.as_bytes()).unwrap_err();
        assert!(matches!(err, ForecastError::EmptyDataset));
    }

    #[test]
    fn demo_is_deterministic_for_seed() {
        let a = Dataset::demo(42, 5);
        let b = Dataset::demo(42, 5);
        assert_eq!(a.len(), 5);
        for name in a.county_names() {
            assert_eq!(a.get(name), b.get(name));
        }
    }

    #[test]
    fn demo_series_are_monthly_month_ends() {
        let ds = Dataset::demo(7, 3);
        let name = ds.county_names()[0];
        let series = ds.get(name).unwrap();
        assert_eq!(series.len(), DEMO_MONTHS as usize);
        assert_eq!(series.points[1].date, NaiveDate::from_ymd_opt(2017, 2, 28).unwrap());
        assert_eq!(series.points[2].date, NaiveDate::from_ymd_opt(2017, 3, 31).unwrap());
        assert!(series.points.iter().all(|p| p.ev_total >= 0.0));
    }
}
