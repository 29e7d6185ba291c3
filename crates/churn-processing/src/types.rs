//! Report types produced by the cleaning and prediction stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Null count for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing_count: usize,
}

/// Per-column null counts, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingValueReport {
    pub rows: usize,
    pub columns: Vec<ColumnMissing>,
}

impl MissingValueReport {
    /// Total missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing_count).sum()
    }

    /// Null count for `column`, if the column exists.
    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.missing_count)
    }
}

/// A column whose nulls were replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputedColumn {
    pub column: String,
    /// "mean", "median" or "constant"
    pub method: String,
    /// Fill value as rendered in messages
    pub value: String,
    pub filled_count: usize,
}

/// Interactive cleaning operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningOperation {
    ImputeNumeric,
    FillUnknown,
    DropMissingRows,
    RemoveDuplicates,
}

impl CleaningOperation {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ImputeNumeric => "Numeric imputation",
            Self::FillUnknown => "Object column fill",
            Self::DropMissingRows => "Drop rows with missing values",
            Self::RemoveDuplicates => "Remove duplicates",
        }
    }
}

/// What one interactive cleaning operation did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub operation: CleaningOperation,
    pub rows_before: usize,
    pub rows_after: usize,
    pub imputed: Vec<ImputedColumn>,
}

impl CleaningReport {
    pub fn new(operation: CleaningOperation, rows_before: usize, rows_after: usize) -> Self {
        Self {
            operation,
            rows_before,
            rows_after,
            imputed: Vec::new(),
        }
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    /// One-line summary for display.
    pub fn message(&self) -> String {
        match self.operation {
            CleaningOperation::ImputeNumeric => {
                if self.imputed.is_empty() {
                    "No numeric columns with missing values.".to_string()
                } else {
                    let method = &self.imputed[0].method;
                    format!("Missing numeric values filled with {}.", method)
                }
            }
            CleaningOperation::FillUnknown => {
                "Missing object values filled with 'Unknown'.".to_string()
            }
            CleaningOperation::DropMissingRows => format!(
                "Dropped {} rows with remaining missing values.",
                self.rows_removed()
            ),
            CleaningOperation::RemoveDuplicates => {
                format!("Removed {} duplicate rows.", self.rows_removed())
            }
        }
    }
}

/// What the fixed prediction-path cleaning did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoCleanReport {
    pub rows_before: usize,
    /// Non-required columns dropped when restricting to the model inputs
    pub dropped_columns: Vec<String>,
    pub duplicates_removed: usize,
    pub imputed: Vec<ImputedColumn>,
    pub null_rows_removed: usize,
    pub rows_after: usize,
}

impl AutoCleanReport {
    pub fn message(&self) -> String {
        format!(
            "Removed {} duplicate rows and {} rows with missing values (after imputation).",
            self.duplicates_removed, self.null_rows_removed
        )
    }
}

/// A required column whose values exceed its domain maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierViolation {
    pub column: String,
    pub limit: f64,
}

impl OutlierViolation {
    pub fn new(column: impl Into<String>, limit: f64) -> Self {
        Self {
            column: column.into(),
            limit,
        }
    }
}

impl fmt::Display for OutlierViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (max allowed: {})", self.column, self.limit)
    }
}

/// A completed stage of the prediction pipeline.
///
/// Stages are recorded as they finish, so a failed run still exposes what the
/// earlier stages did (for example, duplicates removed before an outlier failure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PipelineStep {
    /// Required columns present and numeric
    SchemaValidated,
    /// Automatic cleaning finished
    Cleaned(AutoCleanReport),
    /// Every value within its domain maximum
    OutliersChecked,
    /// Labels produced for every row
    Predicted { rows: usize },
}

impl PipelineStep {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SchemaValidated => "Validating Schema",
            Self::Cleaned(_) => "Cleaning Data",
            Self::OutliersChecked => "Checking Outliers",
            Self::Predicted { .. } => "Predicting",
        }
    }
}

/// Summary of a successful prediction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub cleaning: AutoCleanReport,
    pub rows_predicted: usize,
    /// Number of rows per predicted label
    pub label_counts: BTreeMap<i64, usize>,
    /// RFC 3339 timestamp
    pub generated_at: String,
}
