//! Customer churn data cleaning and prediction.
//!
//! A library for loading customer datasets from CSV, cleaning them
//! interactively or automatically, and running a pre-fitted churn classifier
//! over the result. Built on Polars.
//!
//! # Overview
//!
//! - **Schema Validation**: only the seven known columns may appear; the six
//!   feature columns must be present and numeric before prediction
//! - **Interactive Cleaning**: missing value report, mean/median imputation,
//!   `"Unknown"` fill for text columns, row drop, duplicate removal
//! - **Automatic Cleaning**: the fixed sequence run before prediction
//! - **Outlier Gate**: rejects values beyond domain maxima
//! - **Prediction**: scaler then classifier from [`churn_model`], labels
//!   appended as `Target_Churn`
//! - **Session Controller**: one in-memory session driven by user actions
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use churn_processing::{ChurnConfig, PredictionPipeline, io};
//! use churn_model::ModelArtifacts;
//! use std::sync::Arc;
//!
//! let artifacts = Arc::new(ModelArtifacts::load("models/scaler.json", "models/model.json")?);
//! let config = ChurnConfig::builder().output_dir("outputs").build()?;
//!
//! let df = io::read_csv_file("customers.csv", config.infer_schema_length)?;
//! let pipeline = PredictionPipeline::new(config, artifacts);
//!
//! let mut steps = Vec::new();
//! match pipeline.run(&df, &mut steps) {
//!     Ok(output) => {
//!         io::save_csv(&output.data, &pipeline.config().output_dir, &pipeline.config().output_name)?;
//!     }
//!     Err(e) if e.is_warning() => println!("warning: {}", e),
//!     Err(e) => println!("error: {}", e),
//! }
//! ```
//!
//! # Interactive Sessions
//!
//! [`SessionController`] owns a single session and turns each [`Action`] into
//! an [`ActionOutcome`]. Errors are rendered as messages instead of being
//! returned:
//!
//! ```rust,ignore
//! use churn_processing::{Action, Section, SessionController};
//!
//! let mut controller = SessionController::new(config, artifacts);
//! controller.handle(Action::Upload { name: "customers.csv".into(), bytes });
//! controller.handle(Action::Navigate(Section::Duplicates));
//! let outcome = controller.handle(Action::Navigate(Section::Prediction));
//! for message in &outcome.messages {
//!     println!("[{:?}] {}", message.severity, message.text);
//! }
//! ```

pub mod cleaner;
pub mod config;
pub mod controller;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod schema;
pub mod state;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    ChurnConfig, ChurnConfigBuilder, ColumnLimit, ConfigValidationError, DEFAULT_OUTPUT_NAME,
    ImputationStrategy, OutlierLimits,
};
pub use controller::{
    Action, ActionOutcome, CSV_MIME, Download, Message, Section, SessionController, Severity,
};
pub use error::{ChurnError, Result as ChurnResult, ResultExt};
pub use imputers::{StatisticalImputer, UNKNOWN_TOKEN};
pub use pipeline::{AutoCleaner, OutlierGate, PredictionAdapter, PredictionOutput, PredictionPipeline};
pub use schema::{CHURN_SCHEMA, ColumnKind, ColumnSpec, SchemaValidator, TARGET_COLUMN};
pub use state::{ColumnInfo, FileInfo, Session, SessionState, UploadOutcome};
pub use types::{
    AutoCleanReport, CleaningOperation, CleaningReport, ColumnMissing, ImputedColumn,
    MissingValueReport, OutlierViolation, PipelineStep, PredictionReport,
};

static_assertions::assert_impl_all!(PredictionPipeline: Send, Sync);
static_assertions::assert_impl_all!(SessionController: Send);
