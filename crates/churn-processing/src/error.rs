//! Custom error types for the churn cleaning and prediction pipeline.
//!
//! Every failure a user action can hit is a variant of [`ChurnError`]. Errors
//! propagate with `?` up to the boundary of the action that triggered them
//! (see [`crate::controller::SessionController`]), where they are rendered as
//! messages and the session stays usable.
//!
//! Errors are serializable as `{code, message}` so a front end can display
//! them without parsing strings.

use crate::types::OutlierViolation;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum ChurnError {
    /// Columns outside the allowed set are present.
    #[error("Please remove the extra column(s): {}", .extra.join(", "))]
    Schema { extra: Vec<String> },

    /// Required columns are absent when prediction is requested.
    #[error("The uploaded file is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A required column holds non-numeric data.
    #[error("Column '{column}' must be numeric, found {dtype}")]
    InvalidColumnType { column: String, dtype: String },

    /// Automatic cleaning removed every row.
    #[error("No rows left after cleaning. Please upload a valid dataset.")]
    EmptyResult,

    /// One or more required columns exceed their domain maximum.
    #[error(
        "The following columns contain outlier values that exceed allowed limits: {}",
        .violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    )]
    Outlier { violations: Vec<OutlierViolation> },

    /// The scaler or the classifier failed.
    #[error("Error during batch prediction: {0}")]
    Prediction(String),

    /// An action needs a dataset but nothing has been uploaded.
    #[error("No data loaded")]
    NoDataLoaded,

    /// Download requested before a successful prediction.
    #[error("No predictions available; run the prediction step first")]
    NoPredictionAvailable,

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model artifacts could not be loaded.
    #[error("Model artifact error: {0}")]
    Model(#[from] churn_model::ModelError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ChurnError>,
    },
}

impl ChurnError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ChurnError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::MissingColumns { .. } => "MISSING_COLUMNS",
            Self::InvalidColumnType { .. } => "INVALID_COLUMN_TYPE",
            Self::EmptyResult => "EMPTY_RESULT",
            Self::Outlier { .. } => "OUTLIER_ERROR",
            Self::Prediction(_) => "PREDICTION_ERROR",
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::NoPredictionAvailable => "NO_PREDICTION_AVAILABLE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Model(_) => "MODEL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Warnings are rendered differently from errors but block the same way.
    pub fn is_warning(&self) -> bool {
        match self {
            Self::EmptyResult | Self::NoPredictionAvailable => true,
            Self::WithContext { source, .. } => source.is_warning(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ChurnError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ChurnError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<crate::config::ConfigValidationError> for ChurnError {
    fn from(e: crate::config::ConfigValidationError) -> Self {
        ChurnError::InvalidConfig(e.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ChurnError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ChurnError::Polars(e).with_context(context))
    }
}
