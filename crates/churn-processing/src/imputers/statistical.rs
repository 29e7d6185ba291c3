//! Statistical imputation methods.
//!
//! Provides mean, median and constant imputation.

use crate::error::{ChurnError, Result};
use crate::types::ImputedColumn;
use crate::utils::{fill_numeric_nulls, fill_string_nulls, format_fill_value};
use polars::prelude::*;
use tracing::debug;

/// Literal written into text cells that were null.
pub const UNKNOWN_TOKEN: &str = "Unknown";

/// Statistical imputation methods for filling missing values.
///
/// Each method returns `None` when the column had nothing to fill or no
/// statistic could be computed (every value null).
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Replace nulls in a numeric column with the mean of its non-null values.
    pub fn apply_numeric_mean(df: &mut DataFrame, col_name: &str) -> Result<Option<ImputedColumn>> {
        let series = Self::series_with_nulls(df, col_name)?;
        match series.as_ref().and_then(|s| s.mean()) {
            Some(mean_val) => Self::fill_with_value(df, col_name, mean_val, "mean"),
            None => Ok(None),
        }
    }

    /// Replace nulls in a numeric column with the median of its non-null values.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
    ) -> Result<Option<ImputedColumn>> {
        let series = Self::series_with_nulls(df, col_name)?;
        match series.as_ref().and_then(|s| s.median()) {
            Some(median_val) => Self::fill_with_value(df, col_name, median_val, "median"),
            None => Ok(None),
        }
    }

    /// Replace nulls in a text column with [`UNKNOWN_TOKEN`].
    pub fn apply_constant_imputation(
        df: &mut DataFrame,
        col_name: &str,
    ) -> Result<Option<ImputedColumn>> {
        let Some(series) = Self::series_with_nulls(df, col_name)? else {
            return Ok(None);
        };

        let filled_count = series.null_count();
        let filled = fill_string_nulls(&series, UNKNOWN_TOKEN)?;
        df.replace(col_name, filled)?;

        debug!("Filled '{}' with constant value: '{}'", col_name, UNKNOWN_TOKEN);
        Ok(Some(ImputedColumn {
            column: col_name.to_string(),
            method: "constant".to_string(),
            value: UNKNOWN_TOKEN.to_string(),
            filled_count,
        }))
    }

    /// The column as a Series, or `None` if it has no nulls.
    fn series_with_nulls(df: &DataFrame, col_name: &str) -> Result<Option<Series>> {
        let column = df
            .column(col_name)
            .map_err(|_| ChurnError::ColumnNotFound(col_name.to_string()))?;
        if column.null_count() == 0 {
            return Ok(None);
        }
        Ok(Some(column.as_materialized_series().clone()))
    }

    /// Fill numeric column with a specific value.
    fn fill_with_value(
        df: &mut DataFrame,
        col_name: &str,
        fill_value: f64,
        method: &str,
    ) -> Result<Option<ImputedColumn>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let filled_count = series.null_count();
        let result = fill_numeric_nulls(&series, fill_value)?;
        df.replace(col_name, result)?;

        debug!(
            "Filled '{}' with {}: {:.2} ({} cells)",
            col_name, method, fill_value, filled_count
        );
        Ok(Some(ImputedColumn {
            column: col_name.to_string(),
            method: method.to_string(),
            value: format_fill_value(fill_value),
            filled_count,
        }))
    }
}
