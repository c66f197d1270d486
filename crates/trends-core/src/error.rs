use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Overdose Trends pipeline.
#[derive(Error, Debug)]
pub enum TrendsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The raw text could not be tokenized into header + rows.
    ///
    /// This is the only failure mode of the Row Parser; it aborts the whole
    /// load so no partial dataset is ever exposed.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// The expected data directory or file does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the trends crates.
pub type Result<T> = std::result::Result<T, TrendsError>;
