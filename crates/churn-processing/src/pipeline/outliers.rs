//! Outlier gate.
//!
//! Rejects a dataset when any value exceeds its column's domain maximum.
//! Values are never capped or removed here; the user has to fix the input.

use crate::config::OutlierLimits;
use crate::error::{ChurnError, Result};
use crate::types::OutlierViolation;
use polars::prelude::*;
use tracing::{debug, warn};

/// Checks column values against [`OutlierLimits`].
pub struct OutlierGate;

impl OutlierGate {
    /// Every limited column with a value strictly above its maximum, in limit order.
    ///
    /// Columns absent from the frame are skipped.
    pub fn violations(df: &DataFrame, limits: &OutlierLimits) -> Result<Vec<OutlierViolation>> {
        let mut violations = Vec::new();

        for limit in limits.iter() {
            let Ok(column) = df.column(&limit.column) else {
                continue;
            };
            let values = column.cast(&DataType::Float64)?;
            let exceeded = values
                .as_materialized_series()
                .f64()?
                .into_iter()
                .flatten()
                .filter(|value| *value > limit.max)
                .count();

            if exceeded > 0 {
                debug!(
                    "{} values in '{}' exceed {}",
                    exceeded, limit.column, limit.max
                );
                violations.push(OutlierViolation::new(&limit.column, limit.max));
            }
        }

        Ok(violations)
    }

    /// Fail with [`ChurnError::Outlier`] if any violation exists.
    pub fn check(df: &DataFrame, limits: &OutlierLimits) -> Result<()> {
        let violations = Self::violations(df, limits)?;
        if violations.is_empty() {
            return Ok(());
        }
        warn!("Outlier gate rejected {} columns", violations.len());
        Err(ChurnError::Outlier { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_age_boundary() {
        let limits = OutlierLimits::default();

        let at_limit = df!["Age" => [30.0, 120.0]].unwrap();
        assert!(OutlierGate::check(&at_limit, &limits).is_ok());

        let over = df!["Age" => [30.0, 121.0]].unwrap();
        match OutlierGate::check(&over, &limits) {
            Err(ChurnError::Outlier { violations }) => {
                assert_eq!(violations, vec![OutlierViolation::new("Age", 120.0)]);
            }
            other => panic!("expected outlier error, got {:?}", other),
        }
    }

    #[test]
    fn test_reports_every_column_in_order() {
        let df = df![
            "Num_of_Purchases" => [2000i64],
            "Age" => [500i64],
            "Total_Spend" => [10.0],
        ]
        .unwrap();

        let violations = OutlierGate::violations(&df, &OutlierLimits::default()).unwrap();
        assert_eq!(
            violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>(),
            vec![
                "Age (max allowed: 120)".to_string(),
                "Num_of_Purchases (max allowed: 1000)".to_string(),
            ]
        );
    }

    #[test]
    fn test_nulls_are_ignored() {
        let df = df!["Age" => [None, Some(20.0)]].unwrap();
        assert!(OutlierGate::check(&df, &OutlierLimits::default()).is_ok());
    }

    #[test]
    fn test_custom_limit() {
        let mut limits = OutlierLimits::default();
        limits.set("Age", 65.0);
        let df = df!["Age" => [70.0]].unwrap();
        assert!(OutlierGate::check(&df, &limits).is_err());
    }
}
