//! Prediction backends for the forecast loop.
//!
//! The forecast only needs "given a feature row, return a scalar". Backends
//! are selected at startup and dispatched through the [`Model`] enum.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::config::{ModelConfig, ModelKind};
use crate::error::{ForecastError, Result};
use crate::features::{FEATURE_NAMES, FeatureVector};

/// Scalar prediction from one feature row.
pub trait Predictor {
    /// Predicts the EV total for the month described by `features`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Prediction`] if the backend fails.
    fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

impl<F> Predictor for F
where
    F: Fn(&FeatureVector) -> f64,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        Ok(self(features))
    }
}

/// Persistence baseline: next month repeats the latest month.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaivePredictor;

impl Predictor for NaivePredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        Ok(features.ev_total_lag1)
    }
}

/// Linear regression exported as JSON.
///
/// ```json
/// {
///   "intercept": 0.4,
///   "features": ["months_since_start", "county_encoded", ...],
///   "coefficients": [0.01, 0.0, ...]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    /// Constant term.
    pub intercept: f64,
    /// Feature names, which must match the training column order.
    pub features: Vec<String>,
    /// One weight per feature.
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Loads and validates a JSON artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Io`] if the file cannot be read, a JSON error
    /// if it does not parse, or [`ForecastError::InvalidModel`] if the layout
    /// does not match the feature order.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ForecastError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates a JSON artifact from a string.
    ///
    /// # Errors
    ///
    /// See [`LinearModel::from_json_file`].
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.features.len() != FEATURE_NAMES.len() {
            return Err(ForecastError::InvalidModel(format!(
                "expected {} features, found {}",
                FEATURE_NAMES.len(),
                self.features.len()
            )));
        }
        if self.coefficients.len() != self.features.len() {
            return Err(ForecastError::InvalidModel(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.features.len()
            )));
        }
        for (i, (got, want)) in self.features.iter().zip(FEATURE_NAMES).enumerate() {
            if got != want {
                return Err(ForecastError::InvalidModel(format!(
                    "feature {i} is \"{got}\", expected \"{want}\""
                )));
            }
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::InvalidModel(
                "weights must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features.to_array())
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.intercept + dot)
    }
}

#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;

#[cfg(feature = "onnx")]
mod onnx {
    use std::path::Path;

    use tract_onnx::prelude::*;

    use super::Predictor;
    use crate::error::{ForecastError, Result};
    use crate::features::{FEATURE_NAMES, FeatureVector};

    type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

    /// ONNX regression graph taking a `[1, 9]` f32 row and returning one value.
    pub struct OnnxModel {
        plan: Plan,
    }

    impl std::fmt::Debug for OnnxModel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("OnnxModel").finish_non_exhaustive()
        }
    }

    impl OnnxModel {
        /// Loads and optimizes the graph at `path`.
        ///
        /// # Errors
        ///
        /// Returns [`ForecastError::InvalidModel`] if tract cannot load it.
        pub fn load(path: &Path) -> Result<Self> {
            let invalid = |e: TractError| ForecastError::InvalidModel(e.to_string());
            let plan = tract_onnx::onnx()
                .model_for_path(path)
                .map_err(invalid)?
                .with_input_fact(0, f32::fact([1, FEATURE_NAMES.len()]).into())
                .map_err(invalid)?
                .into_optimized()
                .map_err(invalid)?
                .into_runnable()
                .map_err(invalid)?;
            Ok(Self { plan })
        }
    }

    impl Predictor for OnnxModel {
        fn predict(&self, features: &FeatureVector) -> Result<f64> {
            let failed = |e: TractError| ForecastError::Prediction(e.to_string());
            let row: Vec<f32> = features.to_array().iter().map(|&v| v as f32).collect();
            let input = tract_ndarray::Array2::from_shape_vec((1, FEATURE_NAMES.len()), row)
                .map_err(|e| ForecastError::Prediction(e.to_string()))?;
            let input: Tensor = input.into();
            let outputs = self.plan.run(tvec![input.into()]).map_err(failed)?;
            let view = outputs[0].to_array_view::<f32>().map_err(failed)?;
            view.iter()
                .next()
                .map(|&v| f64::from(v))
                .ok_or_else(|| ForecastError::Prediction("model produced no output".to_string()))
        }
    }
}

/// Backend chosen at startup.
#[derive(Debug)]
pub enum Model {
    /// Persistence baseline.
    Naive(NaivePredictor),
    /// JSON linear regression.
    Linear(LinearModel),
    /// ONNX graph.
    #[cfg(feature = "onnx")]
    Onnx(OnnxModel),
}

impl Model {
    /// Loads the backend described by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns the backend's load error, or
    /// [`ForecastError::BackendUnavailable`] for ONNX without the `onnx` feature.
    pub fn load(cfg: &ModelConfig) -> Result<Self> {
        let model = match cfg.kind {
            ModelKind::Naive => Self::Naive(NaivePredictor),
            ModelKind::Linear => {
                let path = required_path(cfg)?;
                Self::Linear(LinearModel::from_json_file(path)?)
            }
            ModelKind::Onnx => Self::load_onnx(cfg)?,
        };
        info!(backend = model.name(), "model ready");
        Ok(model)
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(cfg: &ModelConfig) -> Result<Self> {
        Ok(Self::Onnx(OnnxModel::load(required_path(cfg)?)?))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(_cfg: &ModelConfig) -> Result<Self> {
        Err(ForecastError::BackendUnavailable("onnx".to_string()))
    }

    /// Short backend label for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Naive(_) => "naive",
            Self::Linear(_) => "linear",
            #[cfg(feature = "onnx")]
            Self::Onnx(_) => "onnx",
        }
    }
}

impl Predictor for Model {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        match self {
            Self::Naive(m) => m.predict(features),
            Self::Linear(m) => m.predict(features),
            #[cfg(feature = "onnx")]
            Self::Onnx(m) => m.predict(features),
        }
    }
}

fn required_path(cfg: &ModelConfig) -> Result<&Path> {
    cfg.path
        .as_deref()
        .ok_or_else(|| ForecastError::InvalidModel("model.path is not set".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Window;

    fn artifact(coefficients: &[f64]) -> String {
        serde_json::json!({
            "intercept": 1.5,
            "features": FEATURE_NAMES,
            "coefficients": coefficients,
        })
        .to_string()
    }

    fn sample_features() -> FeatureVector {
        let rolling = Window::from_tail(&[10.0, 12.0, 15.0]);
        FeatureVector::build(&rolling, &Window::new(), 40, 2).unwrap()
    }

    #[test]
    fn linear_model_is_intercept_plus_dot_product() {
        let mut weights = [0.0; 9];
        weights[0] = 0.5; // months_since_start
        weights[2] = 1.0; // lag1
        let model = LinearModel::from_json_str(&artifact(&weights)).unwrap();

        let pred = model.predict(&sample_features()).unwrap();
        assert!((pred - (1.5 + 20.0 + 15.0)).abs() < 1e-9);
    }

    #[test]
    fn linear_model_rejects_wrong_layout() {
        assert!(matches!(
            LinearModel::from_json_str(&artifact(&[1.0; 8])),
            Err(ForecastError::InvalidModel(_))
        ));

        let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
        names.swap(2, 3);
        let zeros = [0.0_f64; 9];
        let swapped = serde_json::json!({
            "intercept": 0.0,
            "features": names,
            "coefficients": zeros,
        })
        .to_string();
        let err = LinearModel::from_json_str(&swapped).unwrap_err();
        assert!(err.to_string().contains("ev_total_lag2"));
    }

    #[test]
    fn naive_repeats_latest_month() {
        let pred = NaivePredictor.predict(&sample_features()).unwrap();
        assert_eq!(pred, 15.0);
    }

    #[test]
    fn closures_are_predictors() {
        let stub = |_: &FeatureVector| 5.0;
        assert_eq!(stub.predict(&sample_features()).unwrap(), 5.0);
    }

    #[test]
    fn linear_backend_requires_path() {
        let cfg = ModelConfig {
            kind: ModelKind::Linear,
            path: None,
        };
        assert!(matches!(
            Model::load(&cfg),
            Err(ForecastError::InvalidModel(_))
        ));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn onnx_backend_reports_missing_feature() {
        let cfg = ModelConfig {
            kind: ModelKind::Onnx,
            path: Some("model.onnx".into()),
        };
        assert!(matches!(
            Model::load(&cfg),
            Err(ForecastError::BackendUnavailable(_))
        ));
    }
}
