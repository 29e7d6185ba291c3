//! Loading the scaler/classifier pair used at inference time.
//!
//! Both artifacts are read once at process start and never mutated
//! afterwards, so a single [`ModelArtifacts`] can be shared behind an `Arc`.

use crate::classifier::DecisionTreeClassifier;
use crate::error::{ModelError, Result};
use crate::scaler::StandardScaler;
use crate::{Classifier, Scaler};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// The fitted scaler and classifier, loaded together.
#[derive(Clone)]
pub struct ModelArtifacts {
    scaler: Arc<dyn Scaler>,
    classifier: Arc<dyn Classifier>,
}

static_assertions::assert_impl_all!(ModelArtifacts: Send, Sync);

impl fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("features", &self.scaler.feature_names())
            .finish()
    }
}

impl ModelArtifacts {
    /// Pair an arbitrary scaler with an arbitrary classifier.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::FeatureMismatch`] if the two were fitted on
    /// different feature lists.
    pub fn new(scaler: Arc<dyn Scaler>, classifier: Arc<dyn Classifier>) -> Result<Self> {
        if scaler.feature_names() != classifier.feature_names() {
            return Err(ModelError::FeatureMismatch {
                scaler: scaler.feature_names().to_vec(),
                model: classifier.feature_names().to_vec(),
            });
        }
        Ok(Self { scaler, classifier })
    }

    /// Load a [`StandardScaler`] and a [`DecisionTreeClassifier`] from JSON files.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either file does not exist ([`ModelError::ArtifactNotFound`])
    /// - Either file is not a valid artifact ([`ModelError::Json`], [`ModelError::InvalidArtifact`])
    /// - The two artifacts disagree on features ([`ModelError::FeatureMismatch`])
    #[must_use = "returns the loaded artifacts; use them or handle the error"]
    pub fn load(scaler_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Result<Self> {
        let scaler_path = scaler_path.as_ref();
        let model_path = model_path.as_ref();

        let scaler = StandardScaler::from_json(&read_artifact(scaler_path)?)?;
        debug!(
            "Loaded scaler from {} ({} features)",
            scaler_path.display(),
            scaler.n_features()
        );

        let model = DecisionTreeClassifier::from_json(&read_artifact(model_path)?)?;
        debug!(
            "Loaded decision tree from {} (depth {})",
            model_path.display(),
            model.depth()
        );

        let artifacts = Self::new(Arc::new(scaler), Arc::new(model))?;
        info!(
            "Model artifacts ready: {} features",
            artifacts.feature_names().len()
        );
        Ok(artifacts)
    }

    /// Feature names both artifacts were fitted on, in input order.
    pub fn feature_names(&self) -> &[String] {
        self.scaler.feature_names()
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Scale the rows, then classify them.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>> {
        let scaled = self.scaler.transform(rows)?;
        self.classifier.predict(&scaled)
    }
}

fn read_artifact(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ModelError::ArtifactNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::TreeNode;
    use pretty_assertions::assert_eq;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_rejects_feature_mismatch() {
        let scaler = StandardScaler::new(names(&["a", "b"]), vec![0.0; 2], vec![1.0; 2]).unwrap();
        let model =
            DecisionTreeClassifier::new(names(&["a", "c"]), vec![0, 1], TreeNode::Leaf { class: 0 })
                .unwrap();

        let err = ModelArtifacts::new(Arc::new(scaler), Arc::new(model)).unwrap_err();
        assert!(matches!(err, ModelError::FeatureMismatch { .. }));
    }

    #[test]
    fn test_predict_scales_before_classifying() {
        // Threshold 0.0 on the scaled value: raw 10 is the mean, so it maps to 0 -> left
        let scaler = StandardScaler::new(names(&["a"]), vec![10.0], vec![5.0]).unwrap();
        let model = DecisionTreeClassifier::new(
            names(&["a"]),
            vec![0, 1],
            TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: Box::new(TreeNode::Leaf { class: 0 }),
                right: Box::new(TreeNode::Leaf { class: 1 }),
            },
        )
        .unwrap();
        let artifacts = ModelArtifacts::new(Arc::new(scaler), Arc::new(model)).unwrap();

        assert_eq!(
            artifacts.predict(&[vec![10.0], vec![11.0], vec![2.0]]).unwrap(),
            vec![0, 1, 0]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = ModelArtifacts::load("does/not/exist.json", "nor/this.json").unwrap_err();
        assert!(matches!(err, ModelError::ArtifactNotFound { .. }));
    }
}
