//! Configuration types for the churn cleaning and prediction pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default download file name for prediction output.
pub const DEFAULT_OUTPUT_NAME: &str = "predicted_cleaned_churn.csv";

/// Strategy for imputing missing numeric values in interactive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImputationStrategy {
    /// Leave numeric columns untouched
    #[default]
    None,
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
}

impl ImputationStrategy {
    /// Lowercase name used in reports and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mean => "mean",
            Self::Median => "median",
        }
    }
}

impl std::str::FromStr for ImputationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            other => Err(format!(
                "unknown imputation strategy '{}' (expected none, mean or median)",
                other
            )),
        }
    }
}

/// Inclusive maximum for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLimit {
    pub column: String,
    pub max: f64,
}

/// Domain maxima for the required columns, kept in canonical column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlierLimits {
    limits: Vec<ColumnLimit>,
}

impl Default for OutlierLimits {
    fn default() -> Self {
        let defaults = [
            ("Age", 120.0),
            ("Annual_Income", 1_000_000.0),
            ("Total_Spend", 500_000.0),
            ("Num_of_Purchases", 1_000.0),
            ("Average_Transaction_Amount", 100_000.0),
            ("Last_Purchase_Days_Ago", 3_650.0),
        ];
        Self {
            limits: defaults
                .into_iter()
                .map(|(column, max)| ColumnLimit {
                    column: column.to_string(),
                    max,
                })
                .collect(),
        }
    }
}

impl OutlierLimits {
    /// Maximum for `column`, if one is configured.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.limits
            .iter()
            .find(|limit| limit.column == column)
            .map(|limit| limit.max)
    }

    /// Override or add a limit. Existing columns keep their position.
    pub fn set(&mut self, column: impl Into<String>, max: f64) {
        let column = column.into();
        match self.limits.iter_mut().find(|limit| limit.column == column) {
            Some(limit) => limit.max = max,
            None => self.limits.push(ColumnLimit { column, max }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnLimit> {
        self.limits.iter()
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

/// Configuration for the pipeline.
///
/// Use [`ChurnConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use churn_processing::config::ChurnConfig;
///
/// let config = ChurnConfig::builder()
///     .outlier_limit("Age", 100.0)
///     .output_dir("outputs")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnConfig {
    /// Per-column maxima enforced before prediction.
    pub outlier_limits: OutlierLimits,

    /// Rows scanned by the CSV reader to infer column types.
    /// Default: 1000
    pub infer_schema_length: usize,

    /// Directory the prediction CSV is written to.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// File name of the prediction CSV.
    /// Default: "predicted_cleaned_churn.csv"
    pub output_name: String,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            outlier_limits: OutlierLimits::default(),
            infer_schema_length: 1000,
            output_dir: PathBuf::from("outputs"),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

impl ChurnConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ChurnConfigBuilder {
        ChurnConfigBuilder::default()
    }

    /// Full path of the prediction CSV.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for limit in self.outlier_limits.iter() {
            if !limit.max.is_finite() || limit.max <= 0.0 {
                return Err(ConfigValidationError::InvalidLimit {
                    column: limit.column.clone(),
                    value: limit.max,
                });
            }
        }

        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::InvalidInferLength(
                self.infer_schema_length,
            ));
        }

        let name = self.output_name.trim();
        if name.len() <= ".csv".len() || !name.to_ascii_lowercase().ends_with(".csv") {
            return Err(ConfigValidationError::InvalidOutputName(
                self.output_name.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid limit for '{column}': {value} (must be finite and positive)")]
    InvalidLimit { column: String, value: f64 },

    #[error("Invalid schema inference length: {0} (must be at least 1)")]
    InvalidInferLength(usize),

    #[error("Invalid output name '{0}' (must end in .csv)")]
    InvalidOutputName(String),
}

/// Builder for [`ChurnConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ChurnConfigBuilder {
    outlier_limits: Option<OutlierLimits>,
    limit_overrides: Vec<(String, f64)>,
    infer_schema_length: Option<usize>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
}

impl ChurnConfigBuilder {
    /// Replace the whole limit table.
    pub fn outlier_limits(mut self, limits: OutlierLimits) -> Self {
        self.outlier_limits = Some(limits);
        self
    }

    /// Override the maximum for a single column.
    pub fn outlier_limit(mut self, column: impl Into<String>, max: f64) -> Self {
        self.limit_overrides.push((column.into(), max));
        self
    }

    /// Set the number of rows used for CSV type inference.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the output directory for the prediction CSV.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the output file name, including the `.csv` extension.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ChurnConfig` or an error if validation fails.
    pub fn build(self) -> Result<ChurnConfig, ConfigValidationError> {
        let mut outlier_limits = self.outlier_limits.unwrap_or_default();
        for (column, max) in self.limit_overrides {
            outlier_limits.set(column, max);
        }

        let config = ChurnConfig {
            outlier_limits,
            infer_schema_length: self.infer_schema_length.unwrap_or(1000),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("outputs")),
            output_name: self
                .output_name
                .unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChurnConfig::default();
        assert_eq!(config.infer_schema_length, 1000);
        assert_eq!(config.output_name, "predicted_cleaned_churn.csv");
        assert_eq!(config.outlier_limits.len(), 6);
        assert_eq!(config.outlier_limits.get("Age"), Some(120.0));
        assert_eq!(config.outlier_limits.get("Num_of_Purchases"), Some(1000.0));
        assert_eq!(config.outlier_limits.get("Target_Churn"), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ChurnConfig::builder()
            .outlier_limit("Age", 99.0)
            .infer_schema_length(50)
            .output_dir("custom")
            .output_name("scored.csv")
            .build()
            .unwrap();

        assert_eq!(config.outlier_limits.get("Age"), Some(99.0));
        assert_eq!(config.outlier_limits.iter().next().unwrap().column, "Age");
        assert_eq!(config.infer_schema_length, 50);
        assert_eq!(config.output_path(), PathBuf::from("custom/scored.csv"));
    }

    #[test]
    fn test_validation_invalid_limit() {
        let result = ChurnConfig::builder()
            .outlier_limit("Total_Spend", -1.0)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidLimit { .. }
        ));

        let result = ChurnConfig::builder()
            .outlier_limit("Age", f64::NAN)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_output_name() {
        assert!(matches!(
            ChurnConfig::builder().output_name("out.txt").build(),
            Err(ConfigValidationError::InvalidOutputName(_))
        ));
        assert!(ChurnConfig::builder().output_name(".csv").build().is_err());
        assert!(ChurnConfig::builder().output_name("OUT.CSV").build().is_ok());
    }

    #[test]
    fn test_validation_infer_length() {
        assert!(matches!(
            ChurnConfig::builder().infer_schema_length(0).build(),
            Err(ConfigValidationError::InvalidInferLength(0))
        ));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "Median".parse::<ImputationStrategy>().unwrap(),
            ImputationStrategy::Median
        );
        assert_eq!(ImputationStrategy::Mean.as_str(), "mean");
        assert!("mode".parse::<ImputationStrategy>().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "outlier_limits": [{"column": "Age", "max": 100.0}],
            "infer_schema_length": 200,
            "output_dir": "out",
            "output_name": "churn.csv"
        }"#;

        let config: ChurnConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.outlier_limits.len(), 1);
        assert_eq!(config.outlier_limits.get("Age"), Some(100.0));
        assert_eq!(config.infer_schema_length, 200);
        assert!(config.validate().is_ok());
    }
}
