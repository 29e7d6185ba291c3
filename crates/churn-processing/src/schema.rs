//! Column schema for customer churn datasets.
//!
//! [`CHURN_SCHEMA`] is the single description of which columns may appear,
//! which are required for prediction, and the order the model expects them in.
//! [`SchemaValidator`] checks a DataFrame against it.

use crate::error::{ChurnError, Result};
use crate::utils::{is_numeric_dtype, nan_to_null};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Name of the label column; optional on input, produced by prediction.
pub const TARGET_COLUMN: &str = "Target_Churn";

/// Expected value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer or floating point feature
    Numeric,
    /// Class label (input optional, overwritten by prediction)
    Label,
}

impl ColumnKind {
    /// Whether a column of `dtype` can hold values of this kind.
    pub fn accepts(&self, dtype: &DataType) -> bool {
        match self {
            Self::Numeric | Self::Label => is_numeric_dtype(dtype),
        }
    }

    /// Dtype given to a column that holds no values at all.
    pub fn empty_dtype(&self) -> DataType {
        match self {
            Self::Numeric => DataType::Float64,
            Self::Label => DataType::Int64,
        }
    }
}

/// One entry of the schema descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
}

impl ColumnSpec {
    const fn feature(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Numeric,
            required: true,
        }
    }
}

/// Allowed columns in canonical order. Required columns come first, in the
/// order the model was fitted on.
pub const CHURN_SCHEMA: [ColumnSpec; 7] = [
    ColumnSpec::feature("Age"),
    ColumnSpec::feature("Annual_Income"),
    ColumnSpec::feature("Total_Spend"),
    ColumnSpec::feature("Num_of_Purchases"),
    ColumnSpec::feature("Average_Transaction_Amount"),
    ColumnSpec::feature("Last_Purchase_Days_Ago"),
    ColumnSpec {
        name: TARGET_COLUMN,
        kind: ColumnKind::Label,
        required: false,
    },
];

/// Required feature columns, in model input order.
pub fn required_columns() -> Vec<&'static str> {
    CHURN_SCHEMA
        .iter()
        .filter(|spec| spec.required)
        .map(|spec| spec.name)
        .collect()
}

/// Descriptor entry for `name`, if the column is allowed.
pub fn column_spec(name: &str) -> Option<&'static ColumnSpec> {
    CHURN_SCHEMA.iter().find(|spec| spec.name == name)
}

/// Every column name that may appear in a dataset.
pub fn allowed_columns() -> Vec<&'static str> {
    CHURN_SCHEMA.iter().map(|spec| spec.name).collect()
}

/// Validates DataFrame columns against [`CHURN_SCHEMA`].
pub struct SchemaValidator;

impl SchemaValidator {
    /// Columns in `names` that are not in the allowed set, sorted.
    pub fn extra_columns<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let allowed = allowed_columns();
        names
            .into_iter()
            .filter(|name| !allowed.contains(name))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Required columns absent from `names`, in canonical order.
    pub fn missing_columns<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let present: BTreeSet<&str> = names.into_iter().collect();
        required_columns()
            .into_iter()
            .filter(|name| !present.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Fail with [`ChurnError::Schema`] if any column is outside the allowed set.
    ///
    /// Depends only on column names. This gate runs before every stage.
    pub fn validate_columns(df: &DataFrame) -> Result<()> {
        let extra = Self::extra_columns(df.get_column_names().iter().map(|s| s.as_str()));
        if extra.is_empty() {
            Ok(())
        } else {
            debug!("Schema check failed, extra columns: {:?}", extra);
            Err(ChurnError::Schema { extra })
        }
    }

    /// Checks that only apply when prediction is requested.
    ///
    /// - every required column is present ([`ChurnError::MissingColumns`])
    /// - every required column matches its [`ColumnKind`], or is entirely
    ///   null ([`ChurnError::InvalidColumnType`])
    pub fn validate_for_prediction(df: &DataFrame) -> Result<()> {
        let missing = Self::missing_columns(df.get_column_names().iter().map(|s| s.as_str()));
        if !missing.is_empty() {
            return Err(ChurnError::MissingColumns { missing });
        }

        for spec in CHURN_SCHEMA.iter().filter(|spec| spec.required) {
            let column = df.column(spec.name)?;
            let all_null = column.null_count() == column.len();
            if !spec.kind.accepts(column.dtype()) && !all_null {
                return Err(ChurnError::InvalidColumnType {
                    column: spec.name.to_string(),
                    dtype: format!("{:?}", column.dtype()),
                });
            }
        }

        Ok(())
    }

    /// Bring freshly read columns in line with their [`ColumnKind`].
    ///
    /// A column with no values is read as text; it gets the kind's empty
    /// dtype so text filling never touches it. Float NaN becomes null.
    /// Columns outside the schema, and text columns with values, are left
    /// for [`Self::validate_columns`] and [`Self::validate_for_prediction`]
    /// to report.
    pub fn conform_types(mut df: DataFrame) -> Result<DataFrame> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        for name in names {
            let Some(spec) = column_spec(&name) else {
                continue;
            };
            let series = df.column(&name)?.as_materialized_series().clone();

            let conformed = if series.null_count() == series.len()
                && !spec.kind.accepts(series.dtype())
            {
                debug!("Column '{}' is empty, reading as {:?}", name, spec.kind.empty_dtype());
                series.cast(&spec.kind.empty_dtype())?
            } else {
                nan_to_null(&series)?
            };
            df.replace(&name, conformed)?;
        }

        Ok(df)
    }
}
