//! Error type shared by the dataset, model, and forecasting layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by forecast requests and their collaborators.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A request arrived without any county selected.
    #[error("no county selected")]
    NoCountySelected,

    /// The requested county does not exist in the dataset.
    #[error("unknown county \"{0}\"")]
    UnknownCounty(String),

    /// The same county was selected twice in one comparison.
    #[error("county \"{0}\" selected more than once")]
    DuplicateCounty(String),

    /// A comparison asked for more counties than allowed.
    #[error("at most {max} counties can be compared, got {requested}")]
    TooManyCounties { max: usize, requested: usize },

    /// The county has too few monthly observations to derive lag features.
    #[error("county \"{county}\" has {found} monthly observations, at least {required} required")]
    InsufficientHistory {
        county: String,
        required: usize,
        found: usize,
    },

    /// A forecast date fell outside the calendar range chrono can represent.
    #[error("forecast date out of range ({months} months after {base})")]
    DateOutOfRange {
        base: chrono::NaiveDate,
        months: u32,
    },

    /// A dataset row could not be interpreted.
    #[error("dataset row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// The dataset contained no usable rows.
    #[error("dataset is empty")]
    EmptyDataset,

    /// The model artifact is malformed or inconsistent with the feature layout.
    #[error("model artifact: {0}")]
    InvalidModel(String),

    /// The model backend failed while producing a prediction.
    #[error("prediction failed: {0}")]
    Prediction(String),

    /// The configured model backend was not compiled into this binary.
    #[error("model backend \"{0}\" is not enabled in this build")]
    BackendUnavailable(String),

    /// A file could not be opened or read.
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Whether the error stems from the caller's county selection rather than
    /// from data or model problems.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            Self::NoCountySelected
                | Self::UnknownCounty(_)
                | Self::DuplicateCounty(_)
                | Self::TooManyCounties { .. }
                | Self::InsufficientHistory { .. }
        )
    }
}
