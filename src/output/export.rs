//! Per-address export of fetched records

use crate::address::WalletAddress;
use crate::output::combined::{build_combined_rows, DEFAULT_DECIMALS};
use crate::output::csv::{ColumnLayout, CsvCombinedWriter, CsvRecordWriter, TOKEN_TRANSFER_COLUMNS};
use crate::output::path::ExportPaths;
use crate::output::{CombinedWriter, OutputResult, OutputWriter, RecordWriter};
use crate::Record;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes the per-asset files and the combined file for one address
///
/// Every method returns `None` without touching the filesystem when there is
/// nothing to write.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    address: WalletAddress,
    paths: ExportPaths,
    native_decimals: u32,
}

impl ExportWriter {
    /// Writer placing files for `address` under `dir`
    pub fn new(dir: impl Into<PathBuf>, address: WalletAddress) -> Self {
        let paths = ExportPaths::new(dir, &address);
        Self {
            address,
            paths,
            native_decimals: DEFAULT_DECIMALS,
        }
    }

    /// Decimals of the network's native asset, used in the combined file
    pub fn with_native_decimals(mut self, decimals: u32) -> Self {
        self.native_decimals = decimals;
        self
    }

    /// File naming in use
    pub fn paths(&self) -> &ExportPaths {
        &self.paths
    }

    /// Write native transactions with the explorer's own column order
    pub fn write_native(&self, records: &[Record]) -> OutputResult<Option<PathBuf>> {
        self.write_raw(&self.paths.native_file(), ColumnLayout::FirstRecord, records)
    }

    /// Write token transfers of `symbol` with the fixed token column list
    pub fn write_token(&self, symbol: &str, records: &[Record]) -> OutputResult<Option<PathBuf>> {
        self.write_raw(
            &self.paths.token_file(symbol),
            ColumnLayout::Fixed(TOKEN_TRANSFER_COLUMNS),
            records,
        )
    }

    /// Write the combined, hour-sorted transfer log across all assets
    pub fn write_combined<'a, I>(&self, assets: I) -> OutputResult<Option<PathBuf>>
    where
        I: IntoIterator<Item = (&'a str, &'a [Record])>,
    {
        let rows = build_combined_rows(assets, &self.address, self.native_decimals);
        if rows.is_empty() {
            debug!("No combined rows to write");
            return Ok(None);
        }

        let path = self.paths.combined_file();
        let mut writer = CsvCombinedWriter::new(&path)?;
        writer.write_rows(&rows)?;
        writer.close()?;

        info!(path = %path.display(), rows = rows.len(), "Combined transfers saved");
        Ok(Some(path))
    }

    fn write_raw(
        &self,
        path: &Path,
        layout: ColumnLayout,
        records: &[Record],
    ) -> OutputResult<Option<PathBuf>> {
        if records.is_empty() {
            debug!(path = %path.display(), "No records, skipping file");
            return Ok(None);
        }

        let mut writer = CsvRecordWriter::new(path, layout)?;
        writer.write_records(records)?;
        writer.close()?;

        info!(path = %path.display(), records = records.len(), "Records saved");
        Ok(Some(path.to_path_buf()))
    }
}
