//! Imputation module for handling missing values.
//!
//! Mean and median fills for numeric columns and a constant fill for text
//! columns. Statistics are recomputed from the data on every call.

mod statistical;

pub use statistical::{StatisticalImputer, UNKNOWN_TOKEN};
