//! EV forecaster entry point: CLI wiring and one-time context setup.

use std::io::{self, Write};
use std::path::Path;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ev_forecast::cli::{Cli, Command};
use ev_forecast::context::ForecastContext;
use ev_forecast::io::export::{export_forecast_csv, export_trend_csv};
use ev_forecast::report::{write_comparison_report, write_forecast_report};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn write_csv<T>(
    label: &str,
    path: &Path,
    rows: &[T],
    export: fn(&[T], &Path) -> io::Result<()>,
) {
    if let Err(e) = export(rows, path) {
        fail(format!("failed to write {label} CSV: {e}"));
    }
    info!(path = %path.display(), "{label} written");
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let cfg = cli.load_config().unwrap_or_else(|e| fail(e));

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Dataset and model are loaded exactly once; every request below borrows them.
    let ctx = ForecastContext::init(&cfg).unwrap_or_else(|e| fail(e));

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Counties => {
            for name in ctx.counties() {
                if let Err(e) = writeln!(stdout, "{name}") {
                    fail(e);
                }
            }
        }
        Command::Forecast {
            county,
            out,
            trend_out,
        } => {
            let result = match ctx.forecast(&county) {
                Ok(result) => result,
                Err(e) if e.is_selection_error() => {
                    eprintln!("warning: {e}");
                    process::exit(1);
                }
                Err(e) => {
                    error!(error = %e, "forecast failed");
                    fail(e);
                }
            };
            if let Err(e) = write_forecast_report(&mut stdout, &result) {
                fail(e);
            }
            if let Some(path) = out {
                write_csv("forecast", &path, &result.forecast, export_forecast_csv);
            }
            if let Some(path) = trend_out {
                write_csv("trend", &path, &result.trend, export_trend_csv);
            }
        }
        Command::Compare { counties } => {
            let results = match ctx.compare(counties.as_slice()) {
                Ok(results) => results,
                Err(e) if e.is_selection_error() => {
                    eprintln!("warning: {e}");
                    process::exit(1);
                }
                Err(e) => fail(e),
            };
            if let Err(e) = write_comparison_report(&mut stdout, &results) {
                fail(e);
            }
        }
        #[cfg(feature = "api")]
        Command::Serve { .. } => {
            use std::net::SocketAddr;
            use std::sync::Arc;

            let addr: SocketAddr = cfg
                .server
                .bind
                .parse()
                .unwrap_or_else(|e| fail(format!("invalid bind address: {e}")));
            let state = Arc::new(ev_forecast::api::AppState { ctx });
            let rt = tokio::runtime::Runtime::new()
                .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
            if let Err(e) = rt.block_on(ev_forecast::api::serve(state, addr)) {
                fail(format!("server error: {e}"));
            }
        }
        #[cfg(feature = "tui")]
        Command::Tui => {
            drop(stdout);
            if let Err(e) = ev_forecast::tui::run(ctx) {
                fail(format!("TUI crashed: {e}"));
            }
        }
    }
}
