//! Error types for the churn-model crate.
//!
//! This module defines [`ModelError`], the error type returned by artifact
//! loading and by the [`Scaler`](crate::Scaler) and
//! [`Classifier`](crate::Classifier) traits.

use thiserror::Error;

/// The main error type for churn-model operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ModelError {
    /// The artifact file was not found at the given path.
    #[error("Artifact not found: {path}")]
    ArtifactNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The artifact parsed but its contents are inconsistent.
    ///
    /// Common causes:
    /// - `mean` and `scale` have different lengths
    /// - A tree split refers to a feature index outside the fitted range
    /// - A leaf refers to a class that is not listed in `classes`
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Input rows do not have the number of features the artifact was fitted on.
    #[error("Shape mismatch: expected {expected} features, got {actual} (row {row})")]
    ShapeMismatch {
        /// Number of features the artifact expects.
        expected: usize,
        /// Number of features found in the offending row.
        actual: usize,
        /// Index of the first offending row.
        row: usize,
    },

    /// The scaler and the classifier were fitted on different feature lists.
    #[error("Feature mismatch between scaler {scaler:?} and model {model:?}")]
    FeatureMismatch {
        /// Feature names recorded in the scaler artifact.
        scaler: Vec<String>,
        /// Feature names recorded in the model artifact.
        model: Vec<String>,
    },

    /// I/O error while reading an artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact is not valid JSON or does not match the expected layout.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
