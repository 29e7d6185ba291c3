//! In-memory session state.
//!
//! A session starts with the first successful upload and ends on an explicit
//! reset. It holds the dataset under edit (`working`) next to an untouched copy
//! of what was uploaded (`original`).

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// FILE METADATA
// ============================================================================

/// Metadata about one column at upload time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
}

/// Metadata about an uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnInfo>,
    /// RFC 3339 timestamp
    pub loaded_at: String,
}

impl FileInfo {
    pub fn from_dataframe(name: impl Into<String>, size_bytes: u64, df: &DataFrame) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            row_count: df.height(),
            column_count: df.width(),
            columns: df
                .get_columns()
                .iter()
                .map(|col| ColumnInfo {
                    name: col.name().to_string(),
                    dtype: format!("{:?}", col.dtype()),
                    null_count: col.null_count(),
                })
                .collect(),
            loaded_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// The dataset being edited plus its pristine copy.
#[derive(Debug, Clone)]
pub struct Session {
    working: DataFrame,
    original: DataFrame,
    file_info: FileInfo,
}

impl Session {
    pub fn new(df: DataFrame, file_info: FileInfo) -> Self {
        Self {
            original: df.clone(),
            working: df,
            file_info,
        }
    }

    pub fn working(&self) -> &DataFrame {
        &self.working
    }

    /// The dataset as uploaded. Never modified.
    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    pub fn file_info(&self) -> &FileInfo {
        &self.file_info
    }

    /// Replace the working dataset with the result of a cleaning operation.
    pub fn replace_working(&mut self, df: DataFrame) {
        debug!(
            "Working dataset: {} -> {} rows",
            self.working.height(),
            df.height()
        );
        self.working = df;
    }
}

/// Whether an upload started a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadOutcome {
    /// A new session was created
    Loaded,
    /// A session was already active; the file was not read
    Ignored,
}

/// Holds at most one session.
#[derive(Debug, Default)]
pub struct SessionState {
    session: Option<Session>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Start a session unless one is active.
    pub fn start(&mut self, df: DataFrame, file_info: FileInfo) -> UploadOutcome {
        if self.is_active() {
            debug!("Upload of '{}' ignored, session active", file_info.name);
            return UploadOutcome::Ignored;
        }
        info!(
            "Session started with '{}' ({} rows, {} columns)",
            file_info.name, file_info.row_count, file_info.column_count
        );
        self.session = Some(Session::new(df, file_info));
        UploadOutcome::Loaded
    }

    /// End the current session, if any.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            info!("Session reset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn frame() -> DataFrame {
        df!["Age" => [Some(30i64), None]].unwrap()
    }

    #[test]
    fn test_file_info_from_dataframe() {
        let info = FileInfo::from_dataframe("data.csv", 42, &frame());
        assert_eq!(info.row_count, 2);
        assert_eq!(info.column_count, 1);
        assert_eq!(info.columns[0].null_count, 1);
        assert_eq!(info.columns[0].dtype, "Int64");
        assert!(!info.loaded_at.is_empty());
    }

    #[test]
    fn test_second_upload_ignored_until_reset() {
        let mut state = SessionState::new();
        let info = FileInfo::from_dataframe("a.csv", 1, &frame());

        assert_eq!(state.start(frame(), info.clone()), UploadOutcome::Loaded);
        assert_eq!(state.start(frame(), info.clone()), UploadOutcome::Ignored);

        state.reset();
        assert!(!state.is_active());
        assert_eq!(state.start(frame(), info), UploadOutcome::Loaded);
    }

    #[test]
    fn test_original_is_preserved() {
        let mut session = Session::new(frame(), FileInfo::from_dataframe("a.csv", 1, &frame()));
        session.replace_working(df!["Age" => [30i64]].unwrap());

        assert_eq!(session.working().height(), 1);
        assert_eq!(session.original().height(), 2);
    }
}
