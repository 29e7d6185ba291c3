//! Bridge between cleaned DataFrames and the model artifacts.

use crate::error::{ChurnError, Result};
use crate::schema::{TARGET_COLUMN, required_columns};
use churn_model::ModelArtifacts;
use polars::prelude::*;
use tracing::{debug, info};

/// Turns a cleaned frame into a model matrix, runs the scaler and the
/// classifier, and appends the labels as `Target_Churn`.
pub struct PredictionAdapter<'a> {
    artifacts: &'a ModelArtifacts,
}

impl<'a> PredictionAdapter<'a> {
    pub fn new(artifacts: &'a ModelArtifacts) -> Self {
        Self { artifacts }
    }

    /// Rows x required columns, in canonical order.
    pub fn feature_matrix(df: &DataFrame) -> Result<Vec<Vec<f64>>> {
        let mut matrix = vec![Vec::with_capacity(required_columns().len()); df.height()];

        for name in required_columns() {
            let column = df
                .column(name)
                .map_err(|_| ChurnError::ColumnNotFound(name.to_string()))?
                .cast(&DataType::Float64)?;
            for (row, value) in column.as_materialized_series().f64()?.into_iter().enumerate() {
                let value = value.ok_or_else(|| {
                    ChurnError::Prediction(format!("null value in '{}' at row {}", name, row))
                })?;
                matrix[row].push(value);
            }
        }

        Ok(matrix)
    }

    /// Predict a label for every row and return a copy of `df` with the
    /// labels appended. `df` itself is never modified.
    ///
    /// # Errors
    ///
    /// Any scaler or classifier failure becomes [`ChurnError::Prediction`],
    /// as do artifacts fitted on other columns or another column order.
    pub fn predict(&self, df: &DataFrame) -> Result<DataFrame> {
        let expected = required_columns();
        if self.artifacts.feature_names() != expected.as_slice() {
            return Err(ChurnError::Prediction(format!(
                "model features {:?} do not match input columns {:?}",
                self.artifacts.feature_names(),
                expected
            )));
        }

        let matrix = Self::feature_matrix(df)?;
        debug!(
            "Model input: {} rows x {} features",
            matrix.len(),
            required_columns().len()
        );

        let labels = self
            .artifacts
            .predict(&matrix)
            .map_err(|e| ChurnError::Prediction(e.to_string()))?;

        if labels.len() != matrix.len() {
            return Err(ChurnError::Prediction(format!(
                "classifier returned {} labels for {} rows",
                labels.len(),
                matrix.len()
            )));
        }

        let mut output = df.clone();
        output.with_column(Series::new(TARGET_COLUMN.into(), labels))?;

        info!("Predicted labels for {} rows", output.height());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use churn_model::{DecisionTreeClassifier, StandardScaler, TreeNode};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn names() -> Vec<String> {
        required_columns().iter().map(|s| s.to_string()).collect()
    }

    /// Churn when scaled Age is above zero, i.e. Age above 40.
    fn artifacts() -> ModelArtifacts {
        let scaler = StandardScaler::new(
            names(),
            vec![40.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![10.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        )
        .unwrap();
        let model = DecisionTreeClassifier::new(
            names(),
            vec![0, 1],
            TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: Box::new(TreeNode::Leaf { class: 0 }),
                right: Box::new(TreeNode::Leaf { class: 1 }),
            },
        )
        .unwrap();
        ModelArtifacts::new(Arc::new(scaler), Arc::new(model)).unwrap()
    }

    fn frame(ages: &[f64]) -> DataFrame {
        let n = ages.len();
        df![
            "Age" => ages,
            "Annual_Income" => vec![50_000.0; n],
            "Total_Spend" => vec![1_000.0; n],
            "Num_of_Purchases" => vec![10.0; n],
            "Average_Transaction_Amount" => vec![100.0; n],
            "Last_Purchase_Days_Ago" => vec![30.0; n],
        ]
        .unwrap()
    }

    #[test]
    fn test_feature_matrix_order() {
        let df = frame(&[25.0]);
        let matrix = PredictionAdapter::feature_matrix(&df).unwrap();
        assert_eq!(matrix, vec![vec![25.0, 50_000.0, 1_000.0, 10.0, 100.0, 30.0]]);
    }

    #[test]
    fn test_predict_appends_labels() {
        let artifacts = artifacts();
        let df = frame(&[25.0, 55.0, 40.0]);
        let output = PredictionAdapter::new(&artifacts).predict(&df).unwrap();

        assert_eq!(output.width(), 7);
        let labels: Vec<Option<i64>> = output
            .column(TARGET_COLUMN)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some(0), Some(1), Some(0)]);
        // Input untouched
        assert_eq!(df.width(), 6);
    }

    fn artifacts_with(names: Vec<String>) -> ModelArtifacts {
        let n = names.len();
        let scaler = StandardScaler::new(names.clone(), vec![0.0; n], vec![1.0; n]).unwrap();
        let model =
            DecisionTreeClassifier::new(names, vec![0, 1], TreeNode::Leaf { class: 0 }).unwrap();
        ModelArtifacts::new(Arc::new(scaler), Arc::new(model)).unwrap()
    }

    #[test]
    fn test_fewer_model_features_rejected() {
        let artifacts = artifacts_with(names().into_iter().take(5).collect());

        let df = frame(&[25.0, 30.0]);
        match PredictionAdapter::new(&artifacts).predict(&df) {
            Err(ChurnError::Prediction(message)) => {
                assert!(message.contains("do not match input columns"));
            }
            other => panic!("expected prediction error, got {:?}", other),
        }
        assert_eq!(df.width(), 6);
    }

    #[test]
    fn test_reordered_model_features_rejected() {
        let mut reordered = names();
        reordered.swap(0, 5);
        let artifacts = artifacts_with(reordered);

        assert!(matches!(
            PredictionAdapter::new(&artifacts).predict(&frame(&[25.0])),
            Err(ChurnError::Prediction(_))
        ));
    }

    #[test]
    fn test_null_input_rejected() {
        let mut df = frame(&[25.0]);
        df.replace("Age", Series::new("Age".into(), [Option::<f64>::None]))
            .unwrap();
        assert!(matches!(
            PredictionAdapter::feature_matrix(&df),
            Err(ChurnError::Prediction(_))
        ));
    }
}
