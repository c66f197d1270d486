//! Monthly death-count aggregation per derived drug name.
//!
//! Consumes parsed records, filters out non-drug-specific and structurally
//! incomplete rows, derives a canonical drug name from each free-text
//! indicator label, and accumulates the numeric values under a
//! `(year, month, drug)` key. Rows are independent: a bad row is skipped,
//! never an error.

use std::collections::HashMap;

use trends_core::models::{DrugEntry, RawRecord, TotalKey};
use trends_core::months;
use tracing::{debug, warn};

// ── Admission rules ───────────────────────────────────────────────────────────

/// Indicator families excluded from aggregation.
///
/// These mark rows that are not drug-specific ("Number of Deaths", the
/// overall overdose count, the specified-percentage metric) or that are
/// structurally incomplete in the source ("Natural", the truncated
/// "Opioids (T40.0-T40.4" label). Matching is by substring on purpose: it
/// catches the punctuation and suffix variants of the same indicator family
/// that appear across dataset releases.
const EXCLUDED_INDICATORS: [&str; 5] = [
    "Number of Deaths",
    "Number of Drug Overdose Deaths",
    "Percent with drugs specified",
    "Natural",
    "Opioids (T40.0-T40.4",
];

/// Minimum length of a derived drug name.
const MIN_DRUG_NAME_LEN: usize = 2;

// ── Output types ──────────────────────────────────────────────────────────────

/// The aggregation result: the drug catalog plus per-key monthly totals.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedData {
    /// Unique drugs, sorted ascending by canonical name.
    pub drugs: Vec<DrugEntry>,
    /// Accumulated death counts keyed by `(year, month, drug)`.
    /// Carries no ordering; the series builder imposes chronology.
    pub totals: HashMap<TotalKey, f64>,
}

impl AggregatedData {
    /// `true` when nothing survived admission.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// `true` when `name` is in the drug catalog.
    pub fn has_drug(&self, name: &str) -> bool {
        self.drugs.iter().any(|d| d.name == name)
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Stateless helper that folds records into an [`AggregatedData`].
pub struct Aggregator;

impl Aggregator {
    /// Run the admission-and-accumulation pass over `records`.
    ///
    /// Deterministic and idempotent: the same record sequence always yields
    /// the same catalog and totals, and accumulation is order-insensitive.
    pub fn aggregate(records: &[RawRecord]) -> AggregatedData {
        let mut catalog: HashMap<String, DrugEntry> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<TotalKey, f64> = HashMap::new();
        let mut skipped = 0usize;

        for record in records {
            let Some((key, full_name, value)) = Self::admit(record) else {
                skipped += 1;
                continue;
            };

            if !months::is_known_month(&key.month) {
                warn!(
                    month = %key.month,
                    drug = %key.drug,
                    "unrecognised month name; chronological ordering is undefined for it"
                );
            }

            // First-seen-wins: the first full label observed for a canonical
            // name is the one the catalog keeps.
            if !catalog.contains_key(&key.drug) {
                order.push(key.drug.clone());
                catalog.insert(
                    key.drug.clone(),
                    DrugEntry {
                        name: key.drug.clone(),
                        full_name,
                    },
                );
            }

            *totals.entry(key).or_insert(0.0) += value;
        }

        let mut drugs: Vec<DrugEntry> = order
            .into_iter()
            .map(|name| catalog.remove(&name).expect("catalog entry for seen name"))
            .collect();
        drugs.sort_by(|a, b| compare_drug_names(&a.name, &b.name));

        debug!(
            records = records.len(),
            skipped,
            drugs = drugs.len(),
            keys = totals.len(),
            "aggregation pass complete"
        );

        AggregatedData { drugs, totals }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Apply the per-row admission algorithm.
    ///
    /// Returns the totals key, the cleaned full indicator label and the
    /// numeric value, or `None` when the row is skipped.
    fn admit(record: &RawRecord) -> Option<(TotalKey, String, f64)> {
        let indicator = record.get("Indicator")?.trim();
        let data_value = record.get("Data Value")?.trim();
        let year = record.get("Year")?.trim();
        let month = record.get("Month")?.trim();

        if indicator.is_empty() || data_value.is_empty() || year.is_empty() || month.is_empty() {
            return None;
        }

        let indicator = strip_outer_quotes(indicator);

        if EXCLUDED_INDICATORS
            .iter()
            .any(|excluded| indicator.contains(excluded))
        {
            debug!(indicator, "row excluded by indicator family");
            return None;
        }

        let value = parse_data_value(data_value)?;

        let drug_name = derive_drug_name(indicator)?;

        // The totals key is numeric by year; a year that does not parse is an
        // admission failure like any other.
        let year: i32 = match year.parse() {
            Ok(y) => y,
            Err(_) => {
                debug!(year, "row skipped: non-numeric year");
                return None;
            }
        };

        Some((
            TotalKey::new(year, month, drug_name),
            indicator.to_string(),
            value,
        ))
    }
}

// ── Label heuristics ──────────────────────────────────────────────────────────

/// Strip one leading and one trailing quote character (`"` or `'`), if present.
pub fn strip_outer_quotes(text: &str) -> &str {
    let text = text.strip_prefix(['"', '\'']).unwrap_or(text);
    text.strip_suffix(['"', '\'']).unwrap_or(text)
}

/// Derive the canonical drug name from a cleaned indicator label.
///
/// Takes the text up to (but not including) the first `(`, trims it, strips
/// one layer of quotes again and re-trims. Returns `None` when the result is
/// empty or shorter than [`MIN_DRUG_NAME_LEN`] characters. This is a
/// heuristic over free-text labels, not a grammar; the parenthesis typically
/// opens an ICD classification code.
pub fn derive_drug_name(indicator: &str) -> Option<String> {
    let name = indicator.split('(').next().unwrap_or("").trim();
    let name = strip_outer_quotes(name).trim();

    if name.chars().count() < MIN_DRUG_NAME_LEN {
        return None;
    }

    Some(name.to_string())
}

/// Lenient float parse: the longest numeric prefix of `text`.
///
/// Values with trailing junk still yield their leading number — so a
/// thousands-separated `"52,404"` parses as `52` — while fully non-numeric
/// markers like `"Suppressed"` yield `None`. NaN never qualifies.
pub fn parse_data_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let mut parsed: Option<f64> = None;

    let boundaries = text
        .char_indices()
        .map(|(idx, _)| idx)
        .skip(1)
        .chain(std::iter::once(text.len()));
    for end in boundaries {
        if let Ok(value) = text[..end].parse::<f64>() {
            parsed = Some(value);
        }
    }

    parsed.filter(|value| !value.is_nan())
}

/// Catalog ordering: case-insensitive ascending, case-sensitive tiebreak.
fn compare_drug_names(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
