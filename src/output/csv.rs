//! CSV output writers

use crate::downloader::config::FLUSH_INTERVAL;
use crate::output::combined::CombinedRow;
use crate::Record;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{CombinedWriter, OutputError, OutputResult, OutputWriter, RecordWriter};

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Fixed column list of token transfer files
pub const TOKEN_TRANSFER_COLUMNS: &[&str] = &[
    "blockNumber",
    "timeStamp",
    "hash",
    "nonce",
    "blockHash",
    "from",
    "contractAddress",
    "to",
    "value",
    "tokenName",
    "tokenSymbol",
    "tokenDecimal",
    "transactionIndex",
    "gas",
    "gasPrice",
    "gasUsed",
    "cumulativeGasUsed",
    "input",
    "confirmations",
];

/// Header of the combined file
pub const COMBINED_COLUMNS: &[&str] = &["Time", "Token", "Action", "Address", "Amount"];

/// How a [`CsvRecordWriter`] picks its columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Field names of the first record, in explorer order
    FirstRecord,
    /// Fixed list; extra fields are dropped, missing fields left empty
    Fixed(&'static [&'static str]),
}

fn open_buffered(path: &Path, buffer_size: usize) -> OutputResult<Writer<BufWriter<File>>> {
    info!("Creating CSV writer: path={}", path.display());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| OutputError::IoError(format!("Failed to create directory: {}", e)))?;
    }

    let file = File::create(path)
        .map_err(|e| OutputError::IoError(format!("Failed to create file: {}", e)))?;

    Ok(Writer::from_writer(BufWriter::with_capacity(buffer_size, file)))
}

fn finish(writer: Writer<BufWriter<File>>) -> OutputResult<()> {
    let buf_writer = writer
        .into_inner()
        .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {}", e)))?;

    let file = buf_writer
        .into_inner()
        .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {}", e)))?;

    file.sync_all()
        .map_err(|e| OutputError::IoError(format!("Failed to sync file: {}", e)))
}

/// CSV writer for raw explorer records
///
/// The header is written together with the first record.
pub struct CsvRecordWriter {
    writer: Writer<BufWriter<File>>,
    layout: ColumnLayout,
    columns: Option<Vec<String>>,
    records_written: u64,
    path: PathBuf,
}

impl CsvRecordWriter {
    /// Create a writer at `path` with the given column layout
    pub fn new<P: AsRef<Path>>(path: P, layout: ColumnLayout) -> OutputResult<Self> {
        Self::new_with_buffer_size(path, layout, DEFAULT_BUFFER_SIZE)
    }

    /// Create a writer with a custom buffer size
    pub fn new_with_buffer_size<P: AsRef<Path>>(
        path: P,
        layout: ColumnLayout,
        buffer_size: usize,
    ) -> OutputResult<Self> {
        let path = path.as_ref();
        let writer = open_buffered(path, buffer_size)?;

        let columns = match layout {
            ColumnLayout::FirstRecord => None,
            ColumnLayout::Fixed(cols) => Some(cols.iter().map(|c| c.to_string()).collect()),
        };

        Ok(Self {
            writer,
            layout,
            columns,
            records_written: 0,
            path: path.to_path_buf(),
        })
    }

    /// Get number of records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column layout
    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }
}

impl RecordWriter for CsvRecordWriter {
    fn write_record(&mut self, record: &Record) -> OutputResult<()> {
        if self.records_written == 0 {
            let columns = self
                .columns
                .get_or_insert_with(|| record.field_names().map(str::to_string).collect());
            self.writer
                .write_record(columns.iter())
                .map_err(|e| OutputError::CsvError(format!("Failed to write header: {}", e)))?;
        }

        let columns = self.columns.as_deref().unwrap_or_default();
        let row: Vec<String> = columns
            .iter()
            .map(|col| record.text(col).unwrap_or_default())
            .collect();

        self.writer
            .write_record(&row)
            .map_err(|e| OutputError::CsvError(format!("Failed to write record: {}", e)))?;

        self.records_written += 1;

        if self.records_written % FLUSH_INTERVAL as u64 == 0 {
            self.flush()?;
            debug!("Progress: {} records written", self.records_written);
        }

        Ok(())
    }
}

impl OutputWriter for CsvRecordWriter {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {}", e)))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;
        finish(self.writer)?;
        info!(
            "CSV writer closed: {} records written to {}",
            self.records_written,
            self.path.display()
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CombinedCsvRow<'a> {
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Token")]
    token: &'a str,
    #[serde(rename = "Action")]
    action: &'static str,
    #[serde(rename = "Address")]
    address: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
}

impl<'a> From<&'a CombinedRow> for CombinedCsvRow<'a> {
    fn from(row: &'a CombinedRow) -> Self {
        Self {
            time: row.time_label(),
            token: &row.token,
            action: row.action.as_str(),
            address: &row.counterparty,
            amount: row.amount.to_string(),
        }
    }
}

/// CSV writer for the combined transfer file
pub struct CsvCombinedWriter {
    writer: Writer<BufWriter<File>>,
    rows_written: u64,
}

impl CsvCombinedWriter {
    /// Create a writer at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        Ok(Self {
            writer: open_buffered(path.as_ref(), DEFAULT_BUFFER_SIZE)?,
            rows_written: 0,
        })
    }

    /// Get number of rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl CombinedWriter for CsvCombinedWriter {
    fn write_row(&mut self, row: &CombinedRow) -> OutputResult<()> {
        self.writer
            .serialize(CombinedCsvRow::from(row))
            .map_err(|e| OutputError::CsvError(format!("Failed to write row: {}", e)))?;

        self.rows_written += 1;
        if self.rows_written % FLUSH_INTERVAL as u64 == 0 {
            self.flush()?;
        }
        Ok(())
    }
}

impl OutputWriter for CsvCombinedWriter {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {}", e)))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;
        finish(self.writer)?;
        info!("Combined CSV closed: {} rows written", self.rows_written);
        Ok(())
    }
}
