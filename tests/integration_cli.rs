//! Smoke tests for the `ev-forecast` binary.

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ev-forecast"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("ev-forecast process should run")
}

#[test]
fn counties_lists_demo_dataset() {
    let out = run(&["counties"]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).expect("stdout should be UTF-8");
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names.len(), 8);
    assert_eq!(names[0], "Clark");
    assert!(names.contains(&"King"));
}

#[test]
fn forecast_prints_table_and_growth() {
    let out = run(&["--horizon", "6", "forecast", "king"]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).expect("stdout should be UTF-8");
    assert!(stdout.contains("King County (6 months)"));
    assert!(stdout.contains("cumulative EVs"));
    assert!(stdout.contains('%'));
}

#[test]
fn unknown_county_exits_with_warning() {
    let out = run(&["forecast", "Atlantis"]);
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8(out.stderr).expect("stderr should be UTF-8");
    assert!(stderr.contains("unknown county"));
}

#[test]
fn compare_rejects_more_than_three_counties() {
    let out = run(&["compare", "King", "Pierce", "Clark", "Kitsap"]);
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8(out.stderr).expect("stderr should be UTF-8");
    assert!(stderr.contains("at most 3"));
}

#[test]
fn forecast_writes_csv_exports() {
    let dir = std::env::temp_dir().join(format!("ev-forecast-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    let forecast_path = dir.join("forecast.csv");
    let trend_path = dir.join("trend.csv");

    let out = run(&[
        "--horizon",
        "4",
        "forecast",
        "Pierce",
        "--out",
        forecast_path.to_str().expect("utf-8 path"),
        "--trend-out",
        trend_path.to_str().expect("utf-8 path"),
    ]);
    assert!(out.status.success());

    let forecast = std::fs::read_to_string(&forecast_path).expect("forecast CSV should exist");
    assert_eq!(forecast.lines().count(), 5);
    assert!(forecast.starts_with("date,predicted_ev_total"));

    let trend = std::fs::read_to_string(&trend_path).expect("trend CSV should exist");
    assert!(trend.starts_with("date,cumulative_ev,source"));
    assert_eq!(trend.lines().last().map(|l| l.ends_with(",Forecast")), Some(true));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_config_is_reported() {
    let out = run(&["--horizon", "0", "counties"]);
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8(out.stderr).expect("stderr should be UTF-8");
    assert!(stderr.contains("horizon_months"));
}
