//! Decision tree classifier restored from a fitted artifact.

use crate::error::{ModelError, Result};
use crate::{Classifier, check_width};
use serde::{Deserialize, Serialize};

/// Decision tree node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Leaf node with the predicted class label
    Leaf { class: i64 },
    /// Internal node: go left when `x[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn validate(&self, n_features: usize, classes: &[i64]) -> Result<()> {
        match self {
            TreeNode::Leaf { class } => {
                if classes.contains(class) {
                    Ok(())
                } else {
                    Err(ModelError::InvalidArtifact(format!(
                        "leaf class {} is not one of {:?}",
                        class, classes
                    )))
                }
            }
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(ModelError::InvalidArtifact(format!(
                        "split on feature {} but model has {} features",
                        feature, n_features
                    )));
                }
                if threshold.is_nan() {
                    return Err(ModelError::InvalidArtifact(
                        "split threshold is NaN".to_string(),
                    ));
                }
                left.validate(n_features, classes)?;
                right.validate(n_features, classes)
            }
        }
    }
}

/// A fitted binary (or multiclass) decision tree.
///
/// # Artifact layout
///
/// ```json
/// {
///   "feature_names": ["Age", "..."],
///   "classes": [0, 1],
///   "root": {
///     "type": "split", "feature": 5, "threshold": 0.42,
///     "left":  { "type": "leaf", "class": 0 },
///     "right": { "type": "leaf", "class": 1 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    /// Feature names seen during fit, in column order.
    pub feature_names: Vec<String>,
    /// Class labels the tree can emit.
    pub classes: Vec<i64>,
    /// Tree root
    pub root: TreeNode,
}

impl DecisionTreeClassifier {
    /// Build a classifier from a fitted tree, validating its structure.
    pub fn new(feature_names: Vec<String>, classes: Vec<i64>, root: TreeNode) -> Result<Self> {
        let model = Self {
            feature_names,
            classes,
            root,
        };
        model.validate()?;
        Ok(model)
    }

    /// Parse a tree artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Check feature indices and leaf labels against the declared metadata.
    pub fn validate(&self) -> Result<()> {
        if self.feature_names.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "model has no features".to_string(),
            ));
        }
        if self.classes.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "model has no classes".to_string(),
            ));
        }
        self.root.validate(self.feature_names.len(), &self.classes)
    }

    /// Get tree depth
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    fn predict_sample(node: &TreeNode, sample: &[f64]) -> i64 {
        match node {
            TreeNode::Leaf { class } => *class,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>> {
        check_width(rows, self.n_features())?;

        Ok(rows
            .iter()
            .map(|row| Self::predict_sample(&self.root, row))
            .collect())
    }
}
