//! Session controller.
//!
//! Maps user actions (upload, section navigation, the strategy selector, the
//! two cleaning buttons, download, reset) onto the cleaning and prediction
//! stages. Every action runs to completion and returns an [`ActionOutcome`];
//! errors never escape [`SessionController::handle`], they become messages and
//! the session stays usable.

use crate::cleaner::DataCleaner;
use crate::config::{ChurnConfig, ImputationStrategy};
use crate::error::{ChurnError, Result};
use crate::io::{read_csv_bytes, write_csv_bytes};
use crate::pipeline::{PredictionOutput, PredictionPipeline};
use crate::schema::SchemaValidator;
use crate::state::{FileInfo, Session, SessionState, UploadOutcome};
use crate::types::{CleaningReport, MissingValueReport, PipelineStep, PredictionReport};
use churn_model::ModelArtifacts;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Number of rows shown in previews.
const PREVIEW_ROWS: usize = 5;

/// MIME type of the download payload.
pub const CSV_MIME: &str = "text/csv";

// ============================================================================
// ACTIONS AND OUTCOMES
// ============================================================================

/// The four navigable sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    Overview,
    MissingValues,
    Duplicates,
    Prediction,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::MissingValues => "Handle Missing Values",
            Self::Duplicates => "Remove Duplicates",
            Self::Prediction => "Customer Churn Prediction",
        }
    }
}

/// A user interaction.
#[derive(Debug, Clone)]
pub enum Action {
    Upload { name: String, bytes: Vec<u8> },
    Navigate(Section),
    SelectStrategy(ImputationStrategy),
    FillObjectNulls,
    DropMissingRows,
    Download,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A line of feedback shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
    /// Machine-readable code for errors and warnings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Message {
    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            code: None,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Severity::Success, text)
    }

    /// Render an error, as a warning when the error is one.
    pub fn from_error(error: &ChurnError) -> Self {
        let severity = if error.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        };
        Self {
            severity,
            text: error.to_string(),
            code: Some(error.error_code().to_string()),
        }
    }
}

/// A file offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// What the user sees after an action.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    pub section: Section,
    pub messages: Vec<Message>,
    /// Tabular preview of the relevant dataset
    pub preview: Option<String>,
    pub missing_values: Option<MissingValueReport>,
    pub cleaning: Option<CleaningReport>,
    pub prediction: Option<PredictionReport>,
    pub download: Option<Download>,
    pub upload: Option<UploadOutcome>,
}

impl ActionOutcome {
    fn new(section: Section) -> Self {
        Self {
            section,
            ..Self::default()
        }
    }

    /// Whether any message is an error.
    pub fn has_error(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.severity == Severity::Error)
    }

    /// Whether any message is a warning.
    pub fn has_warning(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.severity == Severity::Warning)
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Owns the session and handles one action at a time.
pub struct SessionController {
    state: SessionState,
    pipeline: PredictionPipeline,
    section: Section,
    strategy: ImputationStrategy,
    prediction: Option<PredictionOutput>,
}

impl SessionController {
    pub fn new(config: ChurnConfig, artifacts: Arc<ModelArtifacts>) -> Self {
        Self {
            state: SessionState::new(),
            pipeline: PredictionPipeline::new(config, artifacts),
            section: Section::default(),
            strategy: ImputationStrategy::default(),
            prediction: None,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn strategy(&self) -> ImputationStrategy {
        self.strategy
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    /// The latest successful prediction, if the working data has not changed since.
    pub fn prediction(&self) -> Option<&PredictionOutput> {
        self.prediction.as_ref()
    }

    /// Handle one action. Never fails: errors are rendered into the outcome.
    pub fn handle(&mut self, action: Action) -> ActionOutcome {
        debug!("Handling action {:?}", ActionName(&action));
        if let Action::Navigate(section) = action {
            self.section = section;
        }

        let mut outcome = ActionOutcome::new(self.section);
        if let Err(e) = self.dispatch(action, &mut outcome) {
            if e.is_warning() {
                warn!("{}", e);
            } else {
                error!("{}", e);
            }
            outcome.push(Message::from_error(&e));
        }
        outcome
    }

    fn dispatch(&mut self, action: Action, outcome: &mut ActionOutcome) -> Result<()> {
        match action {
            Action::Upload { name, bytes } => self.upload(name, bytes, outcome),
            Action::Navigate(section) => self.show_section(section, outcome),
            Action::SelectStrategy(strategy) => self.select_strategy(strategy, outcome),
            Action::FillObjectNulls => {
                let session = self.validated_session()?;
                let (df, report) = DataCleaner::fill_object_nulls(session.working())?;
                self.apply_cleaning(df, report, outcome)
            }
            Action::DropMissingRows => {
                let session = self.validated_session()?;
                let (df, report) = DataCleaner::drop_missing_rows(session.working())?;
                self.apply_cleaning(df, report, outcome)
            }
            Action::Download => self.download(outcome),
            Action::Reset => {
                self.state.reset();
                self.prediction = None;
                self.strategy = ImputationStrategy::default();
                self.section = Section::default();
                outcome.section = self.section;
                outcome.push(Message::info("Session cleared. Upload a new file to start."));
                Ok(())
            }
        }
    }

    /// The active session, after the column gate every stage depends on.
    fn validated_session(&self) -> Result<&Session> {
        let session = self.state.session().ok_or(ChurnError::NoDataLoaded)?;
        SchemaValidator::validate_columns(session.working())?;
        Ok(session)
    }

    fn upload(&mut self, name: String, bytes: Vec<u8>, outcome: &mut ActionOutcome) -> Result<()> {
        if self.state.is_active() {
            outcome.upload = Some(UploadOutcome::Ignored);
            outcome.push(Message::info(
                "A dataset is already loaded. Reset the session to upload another file.",
            ));
            return Ok(());
        }

        let df = read_csv_bytes(&bytes, self.pipeline.config().infer_schema_length)?;
        let file_info = FileInfo::from_dataframe(name, bytes.len() as u64, &df);
        outcome.upload = Some(self.state.start(df, file_info));
        self.prediction = None;
        outcome.push(Message::success("File uploaded successfully."));

        // Extra columns are reported immediately; the session is kept so the
        // user can see what was loaded before resetting.
        self.show_section(self.section, outcome)
    }

    fn show_section(&mut self, section: Section, outcome: &mut ActionOutcome) -> Result<()> {
        match section {
            Section::Overview => {
                let session = self.validated_session()?;
                let info = session.file_info();
                outcome.push(Message::info(format!(
                    "{}: {} rows, {} columns (working: {} rows)",
                    info.name,
                    info.row_count,
                    info.column_count,
                    session.working().height()
                )));
                outcome.preview = Some(preview(session.working()));
                Ok(())
            }
            Section::MissingValues => {
                let session = self.validated_session()?;
                outcome.missing_values = Some(DataCleaner::missing_value_report(session.working()));
                outcome.preview = Some(preview(session.working()));
                Ok(())
            }
            Section::Duplicates => {
                let session = self.validated_session()?;
                let (df, report) = DataCleaner::remove_duplicates(session.working())?;
                self.apply_cleaning(df, report, outcome)
            }
            Section::Prediction => self.predict(outcome),
        }
    }

    fn select_strategy(
        &mut self,
        strategy: ImputationStrategy,
        outcome: &mut ActionOutcome,
    ) -> Result<()> {
        self.strategy = strategy;
        let session = self.validated_session()?;
        if strategy == ImputationStrategy::None {
            outcome.missing_values = Some(DataCleaner::missing_value_report(session.working()));
            return Ok(());
        }
        let (df, report) = DataCleaner::impute_numeric(session.working(), strategy)?;
        self.apply_cleaning(df, report, outcome)
    }

    /// Store a cleaning result as the new working dataset and render it.
    fn apply_cleaning(
        &mut self,
        df: polars::prelude::DataFrame,
        report: CleaningReport,
        outcome: &mut ActionOutcome,
    ) -> Result<()> {
        let session = self.state.session_mut().ok_or(ChurnError::NoDataLoaded)?;
        if report.rows_removed() > 0 || !report.imputed.is_empty() {
            self.prediction = None;
        }
        session.replace_working(df);
        debug!("{} applied", report.operation.display_name());

        outcome.push(Message::success(report.message()));
        outcome.missing_values = Some(DataCleaner::missing_value_report(session.working()));
        outcome.preview = Some(preview(session.working()));
        outcome.cleaning = Some(report);
        Ok(())
    }

    fn predict(&mut self, outcome: &mut ActionOutcome) -> Result<()> {
        let session = self.validated_session()?;
        let mut steps = Vec::new();
        let result = self.pipeline.run(session.working(), &mut steps);

        for step in &steps {
            if let PipelineStep::Cleaned(report) = step {
                outcome.push(Message::info(
                    "Only required columns were used for prediction. \
                     Extra columns (except 'Target_Churn') were ignored.",
                ));
                outcome.push(Message::info(report.message()));
            }
        }

        let output = result?;
        outcome.push(Message::success("Predictions completed successfully!"));
        outcome.preview = Some(output.data.to_string());
        outcome.prediction = Some(output.report.clone());
        outcome.download = Some(self.download_payload(&output)?);
        self.prediction = Some(output);
        Ok(())
    }

    fn download(&self, outcome: &mut ActionOutcome) -> Result<()> {
        let output = self
            .prediction
            .as_ref()
            .ok_or(ChurnError::NoPredictionAvailable)?;
        outcome.download = Some(self.download_payload(output)?);
        Ok(())
    }

    fn download_payload(&self, output: &PredictionOutput) -> Result<Download> {
        Ok(Download {
            file_name: self.pipeline.config().output_name.clone(),
            mime: CSV_MIME,
            bytes: write_csv_bytes(&output.data)?,
        })
    }
}

fn preview(df: &polars::prelude::DataFrame) -> String {
    df.head(Some(PREVIEW_ROWS)).to_string()
}

/// Logs an action without its payload.
struct ActionName<'a>(&'a Action);

impl std::fmt::Debug for ActionName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Action::Upload { name, bytes } => write!(f, "Upload({}, {} bytes)", name, bytes.len()),
            other => write!(f, "{:?}", other),
        }
    }
}
