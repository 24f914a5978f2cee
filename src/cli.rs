//! Command-line arguments and config overrides.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, ConfigError, ModelKind};

/// EV adoption forecaster for county-level registration data.
#[derive(Debug, Parser)]
#[command(name = "ev-forecast", version, about)]
pub struct Cli {
    /// Load configuration from a TOML file.
    #[arg(long, global = true, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Use a built-in preset (demo, long_range).
    #[arg(long, global = true)]
    pub preset: Option<String>,

    /// Preprocessed county CSV, overriding `data.path`.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Model artifact; `.onnx` files select the ONNX backend, anything else
    /// is read as a JSON linear model.
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Forecast horizon in months.
    #[arg(long, global = true)]
    pub horizon: Option<u32>,

    /// Seed for the synthetic dataset.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the counties available for forecasting.
    Counties,
    /// Forecast one county.
    Forecast {
        /// County name.
        county: String,
        /// Write the forecast months to CSV.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Write the cumulative trend to CSV.
        #[arg(long)]
        trend_out: Option<PathBuf>,
    },
    /// Compare growth across several counties.
    Compare {
        /// County names.
        #[arg(required = true, num_args = 1..)]
        counties: Vec<String>,
    },
    /// Serve the JSON API.
    #[cfg(feature = "api")]
    Serve {
        /// Socket address, overriding `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Open the interactive terminal dashboard.
    #[cfg(feature = "tui")]
    Tui,
}

impl Cli {
    /// Resolves the configuration: `--config` first, then `--preset`, then
    /// the demo defaults, with command-line overrides applied on top.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for unreadable files or unknown presets.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let mut cfg = if let Some(path) = &self.config {
            AppConfig::from_toml_file(path)?
        } else if let Some(name) = &self.preset {
            AppConfig::from_preset(name)?
        } else {
            AppConfig::demo()
        };

        if let Some(path) = &self.data {
            cfg.data.path = Some(path.clone());
        }
        if let Some(path) = &self.model {
            cfg.model.kind = if path.extension().is_some_and(|ext| ext == "onnx") {
                ModelKind::Onnx
            } else {
                ModelKind::Linear
            };
            cfg.model.path = Some(path.clone());
        }
        if let Some(months) = self.horizon {
            cfg.forecast.horizon_months = months;
        }
        if let Some(seed) = self.seed {
            cfg.data.demo_seed = seed;
        }
        #[cfg(feature = "api")]
        if let Command::Serve { bind: Some(bind) } = &self.command {
            cfg.server.bind = bind.clone();
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ev-forecast").chain(args.iter().copied()))
            .expect("parse should succeed")
    }

    #[test]
    fn supports_forecast_command() {
        let cli = parse(&["forecast", "King", "--out", "king.csv"]);
        match cli.command {
            Command::Forecast { county, out, .. } => {
                assert_eq!(county, "King");
                assert_eq!(out.as_deref().and_then(|p| p.to_str()), Some("king.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn compare_requires_counties() {
        let err = Cli::try_parse_from(["ev-forecast", "compare"]);
        assert!(err.is_err());

        let cli = parse(&["compare", "King", "Pierce"]);
        assert!(matches!(cli.command, Command::Compare { ref counties } if counties.len() == 2));
    }

    #[test]
    fn config_and_preset_are_mutually_exclusive() {
        let err = Cli::try_parse_from([
            "ev-forecast",
            "--config",
            "a.toml",
            "--preset",
            "demo",
            "counties",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let cli = parse(&[
            "--preset",
            "long_range",
            "--horizon",
            "12",
            "--model",
            "m.onnx",
            "counties",
        ]);
        let cfg = cli.load_config().expect("config should load");
        assert_eq!(cfg.forecast.horizon_months, 12);
        assert_eq!(cfg.model.kind, ModelKind::Onnx);
        assert_eq!(cfg.data.demo_counties, 12);
    }

    #[test]
    fn json_model_selects_linear_backend() {
        let cli = parse(&["--model", "weights.json", "counties"]);
        let cfg = cli.load_config().expect("config should load");
        assert_eq!(cfg.model.kind, ModelKind::Linear);
    }

    #[test]
    fn unknown_preset_is_reported() {
        let cli = parse(&["--preset", "nope", "counties"]);
        assert!(cli.load_config().is_err());
    }
}
