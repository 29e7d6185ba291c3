//! Interactive cleaning operations.
//!
//! This module provides functionality for:
//! - Reporting missing values per column
//! - Numeric imputation with a user-chosen strategy
//! - Filling text columns with a constant
//! - Dropping rows that still contain nulls
//! - Removing duplicate rows
//!
//! Every operation takes the working dataset by reference and returns a new
//! dataset plus a report, so the caller decides whether to keep the result.

use crate::config::ImputationStrategy;
use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::types::{CleaningOperation, CleaningReport, ColumnMissing, MissingValueReport};
use crate::utils::{drop_incomplete_rows, numeric_column_names, text_column_names};
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for user-driven cleaning operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Count nulls in every column, in column order. Read-only.
    pub fn missing_value_report(df: &DataFrame) -> MissingValueReport {
        MissingValueReport {
            rows: df.height(),
            columns: df
                .get_columns()
                .iter()
                .map(|col| ColumnMissing {
                    column: col.name().to_string(),
                    missing_count: col.null_count(),
                })
                .collect(),
        }
    }

    /// Fill nulls in every numeric column using `strategy`.
    ///
    /// Statistics are taken from the frame passed in, so repeated calls after
    /// other edits see the current values. [`ImputationStrategy::None`] returns
    /// the frame unchanged.
    pub fn impute_numeric(
        df: &DataFrame,
        strategy: ImputationStrategy,
    ) -> Result<(DataFrame, CleaningReport)> {
        let rows = df.height();
        let mut report = CleaningReport::new(CleaningOperation::ImputeNumeric, rows, rows);
        let mut df = df.clone();

        if strategy == ImputationStrategy::None {
            debug!("Numeric imputation skipped (strategy: none)");
            return Ok((df, report));
        }

        for col_name in numeric_column_names(&df) {
            let imputed = match strategy {
                ImputationStrategy::Mean => {
                    StatisticalImputer::apply_numeric_mean(&mut df, &col_name)?
                }
                ImputationStrategy::Median => {
                    StatisticalImputer::apply_numeric_median(&mut df, &col_name)?
                }
                ImputationStrategy::None => None,
            };
            report.imputed.extend(imputed);
        }

        info!(
            "Imputed {} numeric columns with {}",
            report.imputed.len(),
            strategy.as_str()
        );
        Ok((df, report))
    }

    /// Replace nulls in every text column with `"Unknown"`.
    pub fn fill_object_nulls(df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let rows = df.height();
        let mut report = CleaningReport::new(CleaningOperation::FillUnknown, rows, rows);
        let mut df = df.clone();

        for col_name in text_column_names(&df) {
            report
                .imputed
                .extend(StatisticalImputer::apply_constant_imputation(&mut df, &col_name)?);
        }

        info!("Filled {} text columns with 'Unknown'", report.imputed.len());
        Ok((df, report))
    }

    /// Remove every row with a null in any column.
    pub fn drop_missing_rows(df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let result = drop_incomplete_rows(df)?;
        let report = CleaningReport::new(
            CleaningOperation::DropMissingRows,
            df.height(),
            result.height(),
        );

        info!("Dropped {} rows with missing values", report.rows_removed());
        Ok((result, report))
    }

    /// Remove rows identical to an earlier row, keeping the first and the
    /// original order. Nulls compare equal. Idempotent.
    pub fn remove_duplicates(df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let result = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let report = CleaningReport::new(
            CleaningOperation::RemoveDuplicates,
            df.height(),
            result.height(),
        );

        if report.rows_removed() > 0 {
            debug!("Removed {} duplicate rows", report.rows_removed());
        } else {
            debug!("No duplicate rows found");
        }
        Ok((result, report))
    }
}
