//! TOML-based application configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::forecast::DEFAULT_HORIZON_MONTHS;

/// Top-level configuration parsed from TOML.
///
/// All sections have defaults matching the `demo` preset. Load from TOML
/// with [`AppConfig::from_toml_file`] or use [`AppConfig::demo`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Where county data comes from.
    #[serde(default)]
    pub data: DataConfig,
    /// Which prediction backend to load.
    #[serde(default)]
    pub model: ModelConfig,
    /// Forecast horizon and comparison limits.
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// HTTP API settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Dataset source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Preprocessed CSV path. When unset, a synthetic demo dataset is used.
    pub path: Option<PathBuf>,
    /// Seed for the synthetic dataset.
    pub demo_seed: u64,
    /// Number of counties in the synthetic dataset.
    pub demo_counties: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            demo_seed: 42,
            demo_counties: 8,
        }
    }
}

/// Prediction backend kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Persistence baseline, needs no artifact.
    #[default]
    Naive,
    /// JSON linear regression artifact.
    Linear,
    /// ONNX graph (requires the `onnx` feature).
    Onnx,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive => f.write_str("naive"),
            Self::Linear => f.write_str("linear"),
            Self::Onnx => f.write_str("onnx"),
        }
    }
}

/// Prediction backend settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Backend kind.
    pub kind: ModelKind,
    /// Artifact path (required for `linear` and `onnx`).
    pub path: Option<PathBuf>,
}

/// Forecast settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Months to forecast (must be > 0).
    pub horizon_months: u32,
    /// Maximum counties in one comparison (must be > 0).
    pub max_compare: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            max_compare: 3,
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:3000`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"forecast.horizon_months"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl AppConfig {
    /// Synthetic data with the naive backend; runs without any files.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Demo data with a larger county pool and a five-year horizon.
    pub fn long_range() -> Self {
        Self {
            data: DataConfig {
                demo_counties: 12,
                ..DataConfig::default()
            },
            forecast: ForecastConfig {
                horizon_months: 60,
                ..ForecastConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "long_range"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "long_range" => Ok(Self::long_range()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// Relative data and model paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            cfg.resolve_paths(dir);
        }
        Ok(cfg)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.data.path, &mut self.model.path].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let d = &self.data;
        if d.path.is_none() && d.demo_counties == 0 {
            errors.push(ConfigError {
                field: "data.demo_counties".into(),
                message: "must be > 0 when data.path is not set".into(),
            });
        }

        let m = &self.model;
        if m.kind != ModelKind::Naive && m.path.is_none() {
            errors.push(ConfigError {
                field: "model.path".into(),
                message: format!("required for model kind \"{}\"", m.kind),
            });
        }
        if m.kind == ModelKind::Onnx && !cfg!(feature = "onnx") {
            errors.push(ConfigError {
                field: "model.kind".into(),
                message: "\"onnx\" requires building with the `onnx` feature".into(),
            });
        }

        let f = &self.forecast;
        if f.horizon_months == 0 {
            errors.push(ConfigError {
                field: "forecast.horizon_months".into(),
                message: "must be > 0".into(),
            });
        }
        if f.max_compare == 0 {
            errors.push(ConfigError {
                field: "forecast.max_compare".into(),
                message: "must be > 0".into(),
            });
        }

        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ConfigError {
                field: "server.bind".into(),
                message: format!("\"{}\" is not a socket address", self.server.bind),
            });
        }

        errors
    }
}
