//! Standard scaler (z-score normalization) restored from a fitted artifact.
//!
//! The standard score of a value `x` in feature `j` is:
//!
//! ```text
//! z = (x - mean[j]) / scale[j]
//! ```
//!
//! The artifact stores the statistics computed at fit time; nothing is
//! re-estimated from the data being transformed.

use crate::error::{ModelError, Result};
use crate::{Scaler, check_width};
use serde::{Deserialize, Serialize};

/// A fitted standard scaler.
///
/// # Artifact layout
///
/// ```json
/// {
///   "feature_names": ["Age", "Annual_Income", "..."],
///   "mean": [43.2, 51234.0, "..."],
///   "scale": [12.1, 20111.5, "..."]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Feature names seen during fit, in column order.
    pub feature_names: Vec<String>,
    /// Per-feature mean.
    pub mean: Vec<f64>,
    /// Per-feature standard deviation. Zero entries are treated as 1.0.
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Build a scaler from fitted statistics, validating their shape.
    pub fn new(feature_names: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            feature_names,
            mean,
            scale,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Parse a scaler artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let scaler: Self = serde_json::from_str(json)?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Check that all per-feature vectors agree in length.
    pub fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(ModelError::InvalidArtifact(
                "scaler has no features".to_string(),
            ));
        }
        if self.mean.len() != n || self.scale.len() != n {
            return Err(ModelError::InvalidArtifact(format!(
                "scaler has {} feature names, {} means and {} scales",
                n,
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidArtifact(
                "scaler statistics must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_width(rows, self.n_features())?;

        Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.mean.iter().zip(&self.scale))
                    .map(|(x, (mean, scale))| {
                        let scale = if *scale == 0.0 { 1.0 } else { *scale };
                        (x - mean) / scale
                    })
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scaler() -> StandardScaler {
        StandardScaler::new(
            vec!["a".to_string(), "b".to_string()],
            vec![10.0, 0.0],
            vec![2.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_transform_standardizes() {
        let out = scaler().transform(&[vec![14.0, 3.0], vec![10.0, -1.0]]).unwrap();
        assert_eq!(out, vec![vec![2.0, 3.0], vec![0.0, -1.0]]);
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let err = scaler().transform(&[vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ShapeMismatch {
                expected: 2,
                actual: 1,
                row: 1
            }
        ));
    }

    #[test]
    fn test_transform_empty_input() {
        assert!(scaler().transform(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_from_json_validates_lengths() {
        let json = r#"{"feature_names": ["a", "b"], "mean": [1.0], "scale": [1.0, 1.0]}"#;
        let err = StandardScaler::from_json(json).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArtifact(_)));
    }

    #[test]
    fn test_from_json_roundtrip_fields() {
        let json = r#"{"feature_names": ["a"], "mean": [1.5], "scale": [0.5]}"#;
        let scaler = StandardScaler::from_json(json).unwrap();
        assert_eq!(scaler.n_features(), 1);
        assert_eq!(scaler.transform(&[vec![2.0]]).unwrap(), vec![vec![1.0]]);
    }
}
