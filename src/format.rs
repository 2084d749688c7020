//! CSV output for export runs.
//!
//! [`CsvSink`] owns the output file for the duration of a run. The header is
//! written as soon as the file is opened, rows are appended as they arrive and
//! the writer is flushed on `close()` or when the sink is dropped.

use crate::record::FlatRecord;
use csv::Writer;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Error types that can occur while writing output
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    /// The output directory could not be created
    #[error("failed to create output directory {path:?}: {cause}")]
    OutputDirectory {
        path: PathBuf,
        cause: std::io::Error,
    },
    /// The output file could not be created
    #[error("failed to create output file {path:?}: {cause}")]
    OutputFile {
        path: PathBuf,
        cause: std::io::Error,
    },
    /// Error specific to CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// A row does not line up with the header
    #[error("record columns {found:?} do not match the header {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("the output file has already been closed")]
    SinkClosed,
}

/// Create (or truncate) `path`, creating missing parent directories first.
pub fn create_output_file(path: &Path) -> Result<File, FormattingError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating output directory {}", parent.display());
            fs::create_dir_all(parent).map_err(|cause| FormattingError::OutputDirectory {
                path: parent.to_path_buf(),
                cause,
            })?;
        }
    }

    File::create(path).map_err(|cause| FormattingError::OutputFile {
        path: path.to_path_buf(),
        cause,
    })
}

pub struct CsvSink {
    path: PathBuf,
    columns: Vec<String>,
    writer: Option<Writer<File>>,
    rows: u64,
}

impl CsvSink {
    /// Create the output file and write the header row.
    pub fn open(path: &Path, columns: Vec<String>) -> Result<CsvSink, FormattingError> {
        let file = create_output_file(path)?;

        let mut writer = Writer::from_writer(file);
        writer.write_record(&columns)?;
        writer.flush()?;
        debug!("Opened {} with {} columns", path.display(), columns.len());

        Ok(CsvSink {
            path: path.to_path_buf(),
            columns,
            writer: Some(writer),
            rows: 0,
        })
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn write(&mut self, record: &FlatRecord) -> Result<(), FormattingError> {
        if !record.columns().eq(self.columns.iter().map(String::as_str)) {
            return Err(FormattingError::ColumnMismatch {
                expected: self.columns.clone(),
                found: record.columns().map(str::to_string).collect(),
            });
        }

        let writer = self.writer.as_mut().ok_or(FormattingError::SinkClosed)?;
        writer.write_record(record.values())?;
        self.rows += 1;
        Ok(())
    }

    /// Push buffered rows to the file.
    pub fn flush(&mut self) -> Result<(), FormattingError> {
        let writer = self.writer.as_mut().ok_or(FormattingError::SinkClosed)?;
        writer.flush()?;
        Ok(())
    }

    /// Flush and release the file. Returns the number of rows written.
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<u64, FormattingError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            debug!("Closed {} after {} rows", self.path.display(), self.rows);
        }
        Ok(self.rows)
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!("Failed to flush {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn columns() -> Vec<String> {
        vec!["public_id".to_string(), "tags".to_string()]
    }

    fn record(public_id: &str, tags: &str) -> FlatRecord {
        let mut record = FlatRecord::default();
        record.push("public_id", public_id);
        record.push("tags", tags);
        record
    }

    #[test]
    fn test_open_creates_directories_and_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("2026").join("assets.csv");

        let mut sink = CsvSink::open(&path, columns()).unwrap();
        assert_eq!(sink.close().unwrap(), 0);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "public_id,tags\n");
    }

    #[test]
    fn test_values_are_quoted_when_needed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.csv");

        let mut sink = CsvSink::open(&path, columns()).unwrap();
        sink.write(&record("plain", "x,y")).unwrap();
        sink.write(&record("say \"cheese\"", "")).unwrap();
        assert_eq!(sink.close().unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "public_id,tags\nplain,\"x,y\"\n\"say \"\"cheese\"\"\",\n"
        );
    }

    #[test]
    fn test_mismatched_record_is_rejected() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::open(&dir.path().join("assets.csv"), columns()).unwrap();

        let mut wrong = FlatRecord::default();
        wrong.push("public_id", "a");
        assert!(matches!(
            sink.write(&wrong),
            Err(FormattingError::ColumnMismatch { .. })
        ));
        assert_eq!(sink.rows(), 0);
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::open(&dir.path().join("assets.csv"), columns()).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();

        assert!(matches!(
            sink.write(&record("a", "")),
            Err(FormattingError::SinkClosed)
        ));
    }

    #[test]
    fn test_drop_flushes_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.csv");
        {
            let mut sink = CsvSink::open(&path, columns()).unwrap();
            sink.write(&record("a", "t")).unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "public_id,tags\na,t\n");
    }

    #[test]
    fn test_unwritable_location_fails_on_open() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-directory");
        fs::write(&blocker, "").unwrap();

        let result = CsvSink::open(&blocker.join("assets.csv"), columns());
        assert!(result.is_err());
    }

    #[test]
    fn test_create_output_file_makes_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("2024").join("assets.csv");

        create_output_file(&path).unwrap();
        assert!(path.is_file());

        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        assert!(matches!(
            create_output_file(&blocker.join("x").join("assets.csv")),
            Err(FormattingError::OutputDirectory { .. })
        ));
    }
}
