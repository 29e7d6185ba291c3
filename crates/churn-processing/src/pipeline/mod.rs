//! Pipeline module.
//!
//! Prediction runs as a fixed sequence of stages, each of which can halt the
//! run:
//!
//! ```text
//! schema check ──► automatic cleaning ──► outlier gate ──► prediction
//!   MissingColumns     EmptyResult           Outlier          Prediction
//!   InvalidColumnType
//! ```

mod automatic;
pub mod outliers;
mod prediction;

pub use automatic::AutoCleaner;
pub use outliers::OutlierGate;
pub use prediction::PredictionAdapter;

use crate::config::ChurnConfig;
use crate::error::{ChurnError, Result};
use crate::schema::SchemaValidator;
use crate::types::{PipelineStep, PredictionReport};
use churn_model::ModelArtifacts;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful prediction run.
#[derive(Debug, Clone)]
pub struct PredictionOutput {
    /// Cleaned rows, six required columns plus `Target_Churn`
    pub data: DataFrame,
    pub report: PredictionReport,
}

/// The prediction path: validation, automatic cleaning, outlier gate, model.
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    config: ChurnConfig,
    artifacts: Arc<ModelArtifacts>,
}

impl PredictionPipeline {
    pub fn new(config: ChurnConfig, artifacts: Arc<ModelArtifacts>) -> Self {
        Self { config, artifacts }
    }

    pub fn config(&self) -> &ChurnConfig {
        &self.config
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Run every stage on `df`, recording completed stages into `steps`.
    ///
    /// `df` is not modified. On failure `steps` still holds what the earlier
    /// stages did.
    pub fn run(&self, df: &DataFrame, steps: &mut Vec<PipelineStep>) -> Result<PredictionOutput> {
        info!("Running prediction pipeline on {} rows", df.height());

        SchemaValidator::validate_columns(df)?;
        SchemaValidator::validate_for_prediction(df)?;
        record(steps, PipelineStep::SchemaValidated);

        let (cleaned, cleaning) = AutoCleaner::run(df)?;
        record(steps, PipelineStep::Cleaned(cleaning.clone()));
        if cleaned.height() == 0 {
            warn!("No rows left after automatic cleaning");
            return Err(ChurnError::EmptyResult);
        }

        OutlierGate::check(&cleaned, &self.config.outlier_limits)?;
        record(steps, PipelineStep::OutliersChecked);

        let data = PredictionAdapter::new(&self.artifacts).predict(&cleaned)?;
        record(steps, PipelineStep::Predicted { rows: data.height() });

        let report = PredictionReport {
            cleaning,
            rows_predicted: data.height(),
            label_counts: label_counts(&data)?,
            generated_at: chrono::Local::now().to_rfc3339(),
        };

        info!(
            "Prediction complete: {} rows, labels {:?}",
            report.rows_predicted, report.label_counts
        );
        Ok(PredictionOutput { data, report })
    }
}

fn record(steps: &mut Vec<PipelineStep>, step: PipelineStep) {
    debug!("Stage complete: {}", step.display_name());
    steps.push(step);
}

fn label_counts(df: &DataFrame) -> Result<BTreeMap<i64, usize>> {
    let mut counts = BTreeMap::new();
    let labels = df.column(crate::schema::TARGET_COLUMN)?;
    for label in labels.as_materialized_series().i64()?.into_iter().flatten() {
        *counts.entry(label).or_insert(0) += 1;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::required_columns;
    use churn_model::{DecisionTreeClassifier, StandardScaler, TreeNode};
    use pretty_assertions::assert_eq;

    fn pipeline() -> PredictionPipeline {
        let names: Vec<String> = required_columns().iter().map(|s| s.to_string()).collect();
        let scaler = StandardScaler::new(names.clone(), vec![0.0; 6], vec![1.0; 6]).unwrap();
        let model = DecisionTreeClassifier::new(
            names,
            vec![0, 1],
            TreeNode::Split {
                feature: 5,
                threshold: 90.0,
                left: Box::new(TreeNode::Leaf { class: 0 }),
                right: Box::new(TreeNode::Leaf { class: 1 }),
            },
        )
        .unwrap();
        let artifacts = ModelArtifacts::new(Arc::new(scaler), Arc::new(model)).unwrap();
        PredictionPipeline::new(ChurnConfig::default(), Arc::new(artifacts))
    }

    fn frame(days: &[Option<f64>]) -> DataFrame {
        let n = days.len();
        df![
            "Age" => (0..n).map(|i| Some(20.0 + i as f64)).collect::<Vec<_>>(),
            "Annual_Income" => vec![Some(40_000.0); n],
            "Total_Spend" => vec![Some(2_000.0); n],
            "Num_of_Purchases" => vec![Some(12.0); n],
            "Average_Transaction_Amount" => vec![Some(150.0); n],
            "Last_Purchase_Days_Ago" => days,
        ]
        .unwrap()
    }

    #[test]
    fn test_run_success_records_every_step() {
        let df = frame(&[Some(10.0), Some(200.0), Some(30.0)]);
        let mut steps = Vec::new();
        let output = pipeline().run(&df, &mut steps).unwrap();

        assert_eq!(output.data.shape(), (3, 7));
        assert_eq!(output.report.rows_predicted, 3);
        assert_eq!(output.report.label_counts.get(&0), Some(&2));
        assert_eq!(output.report.label_counts.get(&1), Some(&1));
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[3], PipelineStep::Predicted { rows: 3 });
    }

    #[test]
    fn test_run_missing_columns() {
        let df = df!["Age" => [1.0]].unwrap();
        let mut steps = Vec::new();
        assert!(matches!(
            pipeline().run(&df, &mut steps),
            Err(ChurnError::MissingColumns { .. })
        ));
        assert!(steps.is_empty());
    }

    #[test]
    fn test_run_empty_after_cleaning() {
        let mut df = frame(&[None, None]);
        for name in required_columns() {
            df.replace(name, Series::new(name.into(), [Option::<f64>::None, None]))
                .unwrap();
        }

        let mut steps = Vec::new();
        let err = pipeline().run(&df, &mut steps).unwrap_err();
        assert!(matches!(err, ChurnError::EmptyResult));
        assert!(err.is_warning());

        match &steps[1] {
            PipelineStep::Cleaned(report) => {
                assert_eq!(report.duplicates_removed, 1);
                assert_eq!(report.rows_after, 0);
            }
            other => panic!("expected cleaning step, got {:?}", other),
        }
    }

    #[test]
    fn test_run_outlier_stops_before_model() {
        let df = frame(&[Some(10.0), Some(4000.0)]);
        let mut steps = Vec::new();
        let err = pipeline().run(&df, &mut steps).unwrap_err();

        assert!(
            err.to_string()
                .contains("Last_Purchase_Days_Ago (max allowed: 3650)")
        );
        assert_eq!(steps.len(), 2);
    }
}
