//! CSV file discovery and row parsing for Overdose Trends.
//!
//! Turns raw delimited text into an ordered sequence of [`RawRecord`]s using
//! the first row as the field-name header. Header names are trimmed; rows
//! with no usable fields are skipped. Type and domain checks are deliberately
//! left to the aggregation stage — the only failure mode here is text the
//! CSV reader cannot tokenize at all, which aborts the whole load.

use std::path::{Path, PathBuf};

use trends_core::error::{Result, TrendsError};
use trends_core::models::RawRecord;
use tracing::{debug, warn};

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load records from `path`, which may be a single CSV file or a directory.
///
/// For a directory, every discovered `.csv` file is read and the records are
/// concatenated in sorted path order. Returns [`TrendsError::NoDataFiles`]
/// when a directory contains no CSV files.
pub fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(TrendsError::DataPathNotFound(path.to_path_buf()));
    }

    if path.is_file() {
        return read_csv_file(path);
    }

    let files = find_csv_files(path);
    if files.is_empty() {
        return Err(TrendsError::NoDataFiles(path.to_path_buf()));
    }

    let mut records = Vec::new();
    for file in &files {
        records.extend(read_csv_file(file)?);
    }

    debug!(
        "Loaded {} records from {} files under {}",
        records.len(),
        files.len(),
        path.display()
    );

    Ok(records)
}

/// Read a single CSV file into records.
pub fn read_csv_file(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| TrendsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv_text(&text)
}

/// Parse raw CSV text into header-keyed records.
///
/// The reader is flexible about row width: short or long rows are not an
/// error — missing columns simply produce records without those fields,
/// which the aggregator then skips. A row the tokenizer itself rejects
/// fails the whole parse; no partial record sequence is returned.
pub fn parse_csv_text(text: &str) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    // Header names arrive with whatever whitespace the source carried.
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;

        let record = RawRecord::from_fields(
            headers
                .iter()
                .zip(row.iter())
                .filter(|(name, value)| !name.is_empty() && !value.is_empty())
                .map(|(name, value)| (name.clone(), value.to_string())),
        );

        // Rows that carried nothing usable are dropped here rather than
        // handed downstream.
        if record.is_empty() {
            continue;
        }

        records.push(record);
    }

    debug!("Parsed {} records", records.len());
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
