//! Export writers
//!
//! - [`csv`] - buffered CSV writers for raw records and combined rows
//! - [`combined`] - normalization of records into the combined transfer view
//! - [`path`] - output file naming
//! - [`export`] - [`ExportWriter`], which ties the three together per address

use crate::Record;

pub mod combined;
pub mod csv;
pub mod export;
pub mod path;

pub use combined::{Action, CombinedRow, DEFAULT_DECIMALS};
pub use export::ExportWriter;
pub use path::ExportPaths;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),

    /// Record could not be normalized
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Generic output writer trait
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Writer for raw explorer records
pub trait RecordWriter: OutputWriter {
    /// Write a single record
    fn write_record(&mut self, record: &Record) -> OutputResult<()>;

    /// Write multiple records at once
    fn write_records(&mut self, records: &[Record]) -> OutputResult<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }
}

/// Writer for combined transfer rows
pub trait CombinedWriter: OutputWriter {
    /// Write a single combined row
    fn write_row(&mut self, row: &CombinedRow) -> OutputResult<()>;

    /// Write multiple rows at once
    fn write_rows(&mut self, rows: &[CombinedRow]) -> OutputResult<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }
}
