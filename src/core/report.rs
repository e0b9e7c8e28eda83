//! Results log.
//!
//! Append-only CSV: a header on a fresh file, then one row per classified
//! domain. Rows are flushed as they are written so an interrupted run keeps
//! everything recorded so far.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::{CSV_HEADER, CSV_TIMESTAMP_FORMAT};
use crate::state::OutcomeRecord;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("cannot open results log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write results log: {0}")]
    Write(#[from] csv::Error),
    #[error("cannot flush results log: {0}")]
    Flush(#[from] std::io::Error),
}

/// Destination for classification records.
pub trait ResultSink {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be persisted.
    fn record(&mut self, record: &OutcomeRecord) -> Result<(), SinkError>;

    /// Pushes buffered rows to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered rows could not be written.
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// CSV results log opened in append mode.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Opens (creating if needed) the log at `path`.
    ///
    /// The header is written only if the file is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the header written.
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let open_err = |source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;
        let is_empty = file.metadata().map_err(open_err)?.len() == 0;
        Self::new(file, is_empty)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps a writer, emitting the header first when `write_header` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn new(inner: W, write_header: bool) -> Result<Self, SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        if write_header {
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
        }
        Ok(Self { writer })
    }

    /// Consumes the sink and returns the underlying writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|e| panic!("flushing results log: {e}"))
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn record(&mut self, record: &OutcomeRecord) -> Result<(), SinkError> {
        let timestamp = record.timestamp.format(CSV_TIMESTAMP_FORMAT).to_string();
        let latency = record.latency_ms.to_string();
        self.writer.write_record([
            timestamp.as_str(),
            record.domain.as_str(),
            record.status.as_str(),
            latency.as_str(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
