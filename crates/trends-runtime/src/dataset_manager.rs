//! Cached dataset manager for the trends runtime.
//!
//! Wraps [`load_dataset`] with source-staleness detection and transparent
//! retry. Callers use [`DatasetManager::get_data`] to obtain a shared handle
//! to the current [`DatasetAnalysis`]; a reload builds the complete new
//! analysis first and only then swaps it in, so a handle obtained earlier
//! keeps reading a consistent dataset while the swap happens. On reload
//! failure the previous dataset is returned as a best-effort fallback.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use trends_data::analysis::{load_dataset, DatasetAnalysis};
use trends_data::reader::find_csv_files;

/// Maximum number of load attempts before giving up and returning stale data.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── DatasetManager ────────────────────────────────────────────────────────────

/// Staleness-aware cache around the full load pipeline.
///
/// # Example
/// ```no_run
/// use std::path::PathBuf;
/// use trends_runtime::dataset_manager::DatasetManager;
///
/// let mut mgr = DatasetManager::new(PathBuf::from("data/overdose.csv"));
/// if let Some(analysis) = mgr.get_data(false) {
///     println!("drugs: {}", analysis.data.drugs.len());
/// }
/// ```
pub struct DatasetManager {
    /// CSV file or directory the dataset is loaded from.
    data_path: PathBuf,
    /// Most recently built analysis, shared with callers.
    cache: Option<Arc<DatasetAnalysis>>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    /// Source fingerprint captured at load time.
    source_fingerprint: Option<SystemTime>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
}

impl DatasetManager {
    /// Create a manager for the CSV file or directory at `data_path`.
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            data_path,
            cache: None,
            cache_timestamp: None,
            source_fingerprint: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the current dataset, reloading when the source has changed.
    ///
    /// When `force_reload` is `true` the cache is bypassed and a fresh load
    /// is always attempted. On load failure the previous dataset (if any) is
    /// returned as a best-effort fallback.
    ///
    /// The load is retried up to [`MAX_RETRY_ATTEMPTS`] times with back-off
    /// (0 ms → 100 ms → 200 ms), covering the window where the source file
    /// is being replaced by an external refresh.
    pub fn get_data(&mut self, force_reload: bool) -> Option<Arc<DatasetAnalysis>> {
        if !force_reload && self.is_cache_valid() {
            tracing::debug!("returning cached dataset");
            return self.cache.clone();
        }

        let fingerprint = self.source_fingerprint_now();
        match self.load_with_retry() {
            Ok(analysis) => {
                tracing::debug!(
                    rows = analysis.metadata.rows_read,
                    drugs = analysis.metadata.drugs_found,
                    "dataset cache updated"
                );
                // The new analysis is complete before the swap: readers of
                // the old Arc keep a consistent view.
                self.cache = Some(Arc::new(analysis));
                self.cache_timestamp = Some(Instant::now());
                self.source_fingerprint = fingerprint;
                self.last_error = None;
                self.cache.clone()
            }
            Err(e) => {
                tracing::warn!(error = %e, "load failed; falling back to cached dataset");
                self.last_error = Some(e);
                // Return whatever we have, even if stale.
                self.cache.clone()
            }
        }
    }

    /// Discard the current cache, forcing the next [`DatasetManager::get_data`]
    /// call to load.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        self.source_fingerprint = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if no dataset was loaded.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last load error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The path this manager loads from.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when a dataset is cached and the source has not changed since.
    fn is_cache_valid(&self) -> bool {
        if self.cache.is_none() {
            return false;
        }
        // Without a fingerprint (source vanished, exotic filesystem) the
        // cache stays valid until explicitly invalidated.
        match (self.source_fingerprint, self.source_fingerprint_now()) {
            (Some(loaded), Some(current)) => current <= loaded,
            _ => true,
        }
    }

    /// Latest modification time across the files the load would read.
    fn source_fingerprint_now(&self) -> Option<SystemTime> {
        let mtime = |path: &Path| std::fs::metadata(path).and_then(|m| m.modified()).ok();

        if self.data_path.is_file() {
            return mtime(&self.data_path);
        }

        find_csv_files(&self.data_path)
            .iter()
            .filter_map(|file| mtime(file))
            .max()
    }

    /// Attempt up to [`MAX_RETRY_ATTEMPTS`] loads with back-off.
    fn load_with_retry(&self) -> Result<DatasetAnalysis, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = u64::from(attempt) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying load after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match load_dataset(&self.data_path) {
                Ok(analysis) => return Ok(analysis),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "load attempt failed");
                    last_err = e.to_string();
                }
            }
        }

        Err(last_err)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
Indicator,Data Value,Year,Month
Heroin (T40.1),100,2021,March
";

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    fn make_manager() -> (DatasetManager, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let path = write_csv(dir.path(), "overdose.csv", SAMPLE);
        (DatasetManager::new(path), dir)
    }

    // ── first load ────────────────────────────────────────────────────────

    #[test]
    fn test_first_call_loads_dataset() {
        let (mut mgr, _dir) = make_manager();

        assert!(mgr.cache_age().is_none());
        let analysis = mgr.get_data(false).expect("load succeeds");
        assert_eq!(analysis.data.drugs.len(), 1);
        assert!(mgr.last_error().is_none());
        assert!(mgr.cache_age().is_some());
    }

    // ── cache reuse ───────────────────────────────────────────────────────

    #[test]
    fn test_unchanged_source_served_from_cache() {
        let (mut mgr, _dir) = make_manager();

        let first = mgr.get_data(false).expect("load");
        let second = mgr.get_data(false).expect("cached");

        // Same Arc — no rebuild happened.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_force_reload_rebuilds() {
        let (mut mgr, _dir) = make_manager();

        let first = mgr.get_data(false).expect("load");
        let second = mgr.get_data(true).expect("reload");

        assert!(!Arc::ptr_eq(&first, &second));
        // Both handles stay readable; the earlier one is unaffected by the swap.
        assert_eq!(first.data.drugs, second.data.drugs);
    }

    // ── invalidation ──────────────────────────────────────────────────────

    #[test]
    fn test_invalidate_cache() {
        let (mut mgr, _dir) = make_manager();

        mgr.get_data(false).expect("load");
        assert!(mgr.cache_age().is_some());

        mgr.invalidate_cache();
        assert!(mgr.cache_age().is_none());

        // Next call loads again.
        assert!(mgr.get_data(false).is_some());
    }

    // ── failure fallback ──────────────────────────────────────────────────

    #[test]
    fn test_missing_source_returns_none_and_records_error() {
        let mut mgr = DatasetManager::new(PathBuf::from("/tmp/missing-trends-mgr-xyz.csv"));
        assert!(mgr.get_data(false).is_none());
        assert!(mgr.last_error().is_some());
    }

    #[test]
    fn test_failed_reload_falls_back_to_previous_dataset() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_csv(dir.path(), "overdose.csv", SAMPLE);
        let mut mgr = DatasetManager::new(path.clone());

        let first = mgr.get_data(false).expect("load");

        // Source disappears; a forced reload must fail but still serve the
        // previous dataset.
        std::fs::remove_file(&path).unwrap();
        let fallback = mgr.get_data(true).expect("fallback to cache");

        assert!(Arc::ptr_eq(&first, &fallback));
        assert!(mgr.last_error().is_some());
    }
}
