//! Fixed cleaning applied on the prediction path.

use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::schema::required_columns;
use crate::types::AutoCleanReport;
use crate::utils::{drop_incomplete_rows, nan_to_null};
use polars::prelude::*;
use tracing::{debug, info};

/// Runs the automatic cleaning sequence:
///
/// 1. Restrict to the required columns in model order, cast to Float64,
///    NaN counted as missing
/// 2. Drop exact duplicate rows, keeping the first
/// 3. Fill nulls in each column with its mean
/// 4. Drop rows that still contain a null
///
/// An empty result is returned as-is; the caller decides how to report it.
pub struct AutoCleaner;

impl AutoCleaner {
    /// The frame must already hold every required column
    /// (see [`crate::schema::SchemaValidator::validate_for_prediction`]).
    pub fn run(df: &DataFrame) -> Result<(DataFrame, AutoCleanReport)> {
        let rows_before = df.height();
        let required = required_columns();

        let dropped_columns: Vec<String> = df
            .get_column_names()
            .iter()
            .filter(|name| !required.contains(&name.as_str()))
            .map(|name| name.to_string())
            .collect();
        if !dropped_columns.is_empty() {
            debug!("Restricting to model inputs, dropping {:?}", dropped_columns);
        }

        let mut columns = Vec::with_capacity(required.len());
        for name in &required {
            let as_float = df.column(name)?.cast(&DataType::Float64)?;
            columns.push(nan_to_null(as_float.as_materialized_series())?.into_column());
        }
        let restricted = DataFrame::new(columns)?;

        let deduped = restricted.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let duplicates_removed = rows_before - deduped.height();

        let mut imputed_df = deduped;
        let mut imputed = Vec::new();
        for name in &required {
            imputed.extend(StatisticalImputer::apply_numeric_mean(&mut imputed_df, name)?);
        }

        let cleaned = drop_incomplete_rows(&imputed_df)?;
        let null_rows_removed = imputed_df.height() - cleaned.height();

        let report = AutoCleanReport {
            rows_before,
            dropped_columns,
            duplicates_removed,
            imputed,
            null_rows_removed,
            rows_after: cleaned.height(),
        };

        info!(
            "Automatic cleaning: {} -> {} rows ({} duplicates, {} incomplete)",
            rows_before, report.rows_after, duplicates_removed, null_rows_removed
        );
        Ok((cleaned, report))
    }
}
