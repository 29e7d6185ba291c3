//! Shared utilities for the cleaning and prediction stages.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

/// Names of numeric columns, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of text columns, in frame order.
pub fn text_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_text_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Null Handling Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let as_float = series.cast(&DataType::Float64)?;
    let values: Vec<f64> = as_float
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let values: Vec<&str> = series
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Replace NaN with null in a float Series. Other dtypes are returned as-is.
///
/// Float32 input comes back as Float64.
pub fn nan_to_null(series: &Series) -> PolarsResult<Series> {
    if !matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
        return Ok(series.clone());
    }
    let as_float = series.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = as_float
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Mask that is `true` for rows without a null in any column.
pub fn complete_rows_mask(df: &DataFrame) -> BooleanChunked {
    let mut mask = BooleanChunked::full("complete".into(), true, df.height());
    for col in df.get_columns() {
        if col.null_count() > 0 {
            mask = &mask & &col.as_materialized_series().is_not_null();
        }
    }
    mask
}

/// Drop every row that contains a null in any column.
pub fn drop_incomplete_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    if df.get_columns().iter().all(|col| col.null_count() == 0) {
        return Ok(df.clone());
    }
    df.filter(&complete_rows_mask(df))
}

/// Render a fill value without trailing zeros for whole numbers.
pub fn format_fill_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float32));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_column_names_by_kind() {
        let df = df![
            "Age" => [1i64, 2],
            "Note" => ["a", "b"],
            "Total_Spend" => [1.0, 2.0],
        ]
        .unwrap();
        assert_eq!(numeric_column_names(&df), vec!["Age", "Total_Spend"]);
        assert_eq!(text_column_names(&df), vec!["Note"]);
    }

    #[test]
    fn test_fill_numeric_nulls_casts_integers() {
        let series = Series::new("x".into(), [Some(1i64), None, Some(3)]);
        let filled = fill_numeric_nulls(&series, 2.5).unwrap();
        assert_eq!(filled.dtype(), &DataType::Float64);
        assert_eq!(filled.null_count(), 0);
        let values: Vec<Option<f64>> = filled.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(2.5), Some(3.0)]);
    }

    #[test]
    fn test_nan_to_null() {
        let series = Series::new("x".into(), [Some(1.5), Some(f64::NAN), None]);
        let cleaned = nan_to_null(&series).unwrap();
        assert_eq!(cleaned.null_count(), 2);
        assert_eq!(cleaned.f64().unwrap().get(0), Some(1.5));

        let ints = Series::new("n".into(), [1i64, 2]);
        assert!(nan_to_null(&ints).unwrap().equals(&ints));
    }

    #[test]
    fn test_fill_string_nulls_keeps_existing_values() {
        let series = Series::new("s".into(), [Some("a"), None, Some("c")]);
        let filled = fill_string_nulls(&series, "Unknown").unwrap();
        let values: Vec<Option<&str>> = filled.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("a"), Some("Unknown"), Some("c")]);
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let df = df![
            "a" => [Some(1.0), None, Some(3.0)],
            "b" => [Some("x"), Some("y"), None],
        ]
        .unwrap();
        let result = drop_incomplete_rows(&df).unwrap();
        assert_eq!(result.height(), 1);
        assert_eq!(
            result.column("a").unwrap().get(0).unwrap().try_extract::<f64>().unwrap(),
            1.0
        );
    }

    #[test]
    fn test_format_fill_value() {
        assert_eq!(format_fill_value(120.0), "120");
        assert_eq!(format_fill_value(3.14159), "3.14");
    }
}
