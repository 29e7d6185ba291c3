//! churn-model: pre-fitted inference artifacts for churn prediction.
//!
//! This crate holds the two collaborators the prediction step calls into:
//! a feature [`Scaler`] and a [`Classifier`]. Both are fitted elsewhere and
//! shipped as JSON artifacts; this crate only restores and applies them.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use churn_model::ModelArtifacts;
//!
//! // Load once at startup
//! let artifacts = ModelArtifacts::load("models/scaler.json", "models/model.json")?;
//!
//! // rows x features, in the order given by artifacts.feature_names()
//! let labels = artifacts.predict(&[vec![34.0, 52000.0, 1200.0, 14.0, 85.7, 30.0]])?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! rows ──► Scaler::transform ──► scaled rows ──► Classifier::predict ──► labels
//! ```
//!
//! Any type implementing the traits can be plugged in through
//! [`ModelArtifacts::new`]; [`StandardScaler`] and [`DecisionTreeClassifier`]
//! are the JSON-backed implementations.

pub mod artifacts;
pub mod classifier;
pub mod error;
pub mod scaler;

pub use artifacts::ModelArtifacts;
pub use classifier::{DecisionTreeClassifier, TreeNode};
pub use error::{ModelError, Result};
pub use scaler::StandardScaler;

/// A fitted feature transform applied before classification.
pub trait Scaler: Send + Sync {
    /// Number of features the scaler was fitted on.
    fn n_features(&self) -> usize;

    /// Feature names in input order.
    fn feature_names(&self) -> &[String];

    /// Transform `rows` into a matrix of identical shape.
    ///
    /// # Errors
    ///
    /// [`ModelError::ShapeMismatch`] if any row has the wrong width.
    fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;
}

/// A fitted classifier producing one label per row.
pub trait Classifier: Send + Sync {
    /// Number of features the classifier was fitted on.
    fn n_features(&self) -> usize;

    /// Feature names in input order.
    fn feature_names(&self) -> &[String];

    /// Predict a class label for every row.
    ///
    /// # Errors
    ///
    /// [`ModelError::ShapeMismatch`] if any row has the wrong width.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>>;
}

/// Reject the first row whose width differs from `expected`.
pub(crate) fn check_width(rows: &[Vec<f64>], expected: usize) -> Result<()> {
    match rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(ModelError::ShapeMismatch {
            expected,
            actual: rows[row].len(),
            row,
        }),
        None => Ok(()),
    }
}
