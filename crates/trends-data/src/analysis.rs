//! Top-level load pipeline for Overdose Trends.
//!
//! Orchestrates reading and aggregation, returning a [`DatasetAnalysis`]
//! ready for series derivation, along with metadata about the pass.

use std::path::Path;

use chrono::Utc;
use trends_core::error::Result;

use crate::aggregator::{AggregatedData, Aggregator};
use crate::reader::load_raw_records;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the aggregated dataset.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DatasetMetadata {
    /// ISO-8601 timestamp when this dataset was built.
    pub generated_at: String,
    /// Source path the records were read from.
    pub source: String,
    /// Number of raw records read.
    pub rows_read: usize,
    /// Number of distinct `(year, month, drug)` totals produced.
    pub totals_keys: usize,
    /// Number of drugs in the catalog.
    pub drugs_found: usize,
    /// Wall-clock seconds spent reading and parsing the CSV text.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent in the aggregation pass.
    pub aggregate_time_seconds: f64,
}

/// The complete output of [`load_dataset`].
#[derive(Debug, Clone)]
pub struct DatasetAnalysis {
    /// Drug catalog and monthly totals.
    pub data: AggregatedData,
    /// Metadata about this load.
    pub metadata: DatasetMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full load pipeline against `path` (a CSV file or a directory).
///
/// 1. Read raw records via the Row Parser.
/// 2. Fold them through the Aggregator.
/// 3. Return the dataset with build metadata.
///
/// Only the read step can fail; aggregation is total over whatever records
/// were produced.
pub fn load_dataset(path: &Path) -> Result<DatasetAnalysis> {
    let load_start = std::time::Instant::now();
    let records = load_raw_records(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let aggregate_start = std::time::Instant::now();
    let data = Aggregator::aggregate(&records);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let metadata = DatasetMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source: path.display().to_string(),
        rows_read: records.len(),
        totals_keys: data.totals.len(),
        drugs_found: data.drugs.len(),
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };

    tracing::info!(
        rows = metadata.rows_read,
        drugs = metadata.drugs_found,
        keys = metadata.totals_keys,
        "dataset loaded from {}",
        path.display()
    );

    Ok(DatasetAnalysis { data, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
