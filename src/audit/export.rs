//! CSV and JSON writers for flat export rows.
//!
//! Every export kind declares a fixed header through [`ExportRecord`]. CSV
//! output always starts with that header, so an empty export is a
//! header-only file. JSON output is a pretty-printed array of field-named
//! objects (`[]` when empty). Files are truncated on open and flushed before
//! the writer returns.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A row with a fixed, ordered column contract.
pub trait ExportRecord: Serialize {
    /// Column names, in output order
    const HEADER: &'static [&'static str];

    /// Field values in the same order as [`Self::HEADER`]
    fn fields(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Both,
}

impl ExportFormat {
    pub fn includes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn includes_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

/// Write `rows` as CSV with `R::HEADER` as the first record.
pub fn write_csv<R: ExportRecord>(path: &Path, rows: &[R]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    writer
        .write_record(R::HEADER)
        .with_context(|| format!("Failed to write CSV header to: {}", path.display()))?;

    for row in rows {
        let fields = row.fields();
        debug_assert_eq!(fields.len(), R::HEADER.len());
        writer
            .write_record(&fields)
            .with_context(|| format!("Failed to write CSV row to: {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
    Ok(())
}

/// Write `rows` as a pretty-printed JSON array.
pub fn write_json<R: ExportRecord>(path: &Path, rows: &[R]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, rows)
        .with_context(|| format!("Failed to write JSON to: {}", path.display()))?;
    writeln!(writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush JSON file: {}", path.display()))?;
    Ok(())
}

/// Write `rows` to `<dir>/<stem>.csv` and/or `<dir>/<stem>.json`.
///
/// Returns the paths written, in CSV-then-JSON order.
pub fn export_rows<R: ExportRecord>(
    dir: &Path,
    stem: &str,
    format: ExportFormat,
    rows: &[R],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if format.includes_csv() {
        let path = dir.join(format!("{}.csv", stem));
        write_csv(&path, rows)?;
        written.push(path);
    }

    if format.includes_json() {
        let path = dir.join(format!("{}.json", stem));
        write_json(&path, rows)?;
        written.push(path);
    }

    Ok(written)
}
