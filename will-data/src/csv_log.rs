//! CSV-backed submission log.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;
use will_core::{LogError, SubmissionLog, SubmissionRow};

fn csv_error(err: csv::Error) -> LogError {
    LogError::Write(err.to_string())
}

/// Appends one CSV record per generated document.
///
/// The header row is written when the file is new or empty. Appends from
/// one process are serialised; separate processes sharing a file are not
/// coordinated.
pub struct CsvSubmissionLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvSubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_row(
        &self,
        row: &SubmissionRow,
    ) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(row.columns()).map_err(csv_error)?;
        }
        writer.write_record(row.values()).map_err(csv_error)?;
        writer.flush()?;
        Ok(())
    }
}

impl SubmissionLog for CsvSubmissionLog {
    fn append(
        &self,
        row: &SubmissionRow,
    ) -> Result<(), LogError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| LogError::Write("submission log lock poisoned".to_string()))?;
        self.write_row(row)?;
        info!(path = %self.path.display(), "submission logged");
        Ok(())
    }
}
