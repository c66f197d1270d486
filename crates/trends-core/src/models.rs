use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::months;

/// One parsed input row: a mapping from trimmed column name to raw string
/// value.
///
/// Records are ephemeral — they exist between the Row Parser and the
/// Aggregator and are discarded after the aggregation pass. Values are kept
/// exactly as read; trimming and type checks happen at admission time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    /// Build a record from `(column name, value)` pairs.
    pub fn from_fields(fields: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Raw value of the named column, if the row carried one.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// `true` when the row carried no usable fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// A drug in the catalog derived from the indicator labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugEntry {
    /// Canonical short label, e.g. `"Heroin"`.
    pub name: String,
    /// The cleaned indicator text before truncation, e.g. `"Heroin (T40.1)"`.
    pub full_name: String,
}

/// Composite key for one accumulated monthly total: `(year, month, drug)`.
///
/// Exactly one total exists per distinct key; repeated observations are
/// summed into it, never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TotalKey {
    pub year: i32,
    /// Full English month name as it appeared in the source.
    pub month: String,
    /// Canonical drug name derived from the indicator.
    pub drug: String,
}

impl TotalKey {
    pub fn new(year: i32, month: impl Into<String>, drug: impl Into<String>) -> Self {
        Self {
            year,
            month: month.into(),
            drug: drug.into(),
        }
    }

    /// The join key aligning different drugs onto the same time axis.
    pub fn date_key(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }
}

/// The externally consumed chart shape: one point on the monthly time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Join key `"{year}-{month}"`, unique within a series.
    pub date_key: String,
    /// Accumulated death count for this point.
    pub value: f64,
    /// Short display string, e.g. `"Mar 2021"`.
    pub label: String,
    /// Full English month name.
    pub month: String,
    pub year: i32,
}

impl ChartPoint {
    /// Build a point for `(year, month)`, deriving `date_key` and `label`.
    pub fn new(year: i32, month: impl Into<String>, value: f64) -> Self {
        let month = month.into();
        Self {
            date_key: format!("{}-{}", year, month),
            label: format!("{} {}", months::short_label(&month), year),
            month,
            year,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── RawRecord ─────────────────────────────────────────────────────────

    #[test]
    fn test_raw_record_get() {
        let record = RawRecord::from_fields([
            ("Indicator".to_string(), "Heroin (T40.1)".to_string()),
            ("Year".to_string(), "2021".to_string()),
        ]);
        assert_eq!(record.get("Indicator"), Some("Heroin (T40.1)"));
        assert_eq!(record.get("Month"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_raw_record_empty() {
        let record = RawRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.len(), 0);
    }

    // ── TotalKey ──────────────────────────────────────────────────────────

    #[test]
    fn test_total_key_date_key() {
        let key = TotalKey::new(2021, "March", "Heroin");
        assert_eq!(key.date_key(), "2021-March");
    }

    #[test]
    fn test_total_key_equality_and_hash() {
        use std::collections::HashMap;
        let mut totals: HashMap<TotalKey, f64> = HashMap::new();
        totals.insert(TotalKey::new(2021, "March", "Heroin"), 10.0);
        *totals
            .entry(TotalKey::new(2021, "March", "Heroin"))
            .or_insert(0.0) += 5.0;
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&TotalKey::new(2021, "March", "Heroin")], 15.0);
    }

    // ── ChartPoint ────────────────────────────────────────────────────────

    #[test]
    fn test_chart_point_derivations() {
        let point = ChartPoint::new(2021, "March", 42.0);
        assert_eq!(point.date_key, "2021-March");
        assert_eq!(point.label, "Mar 2021");
        assert_eq!(point.month, "March");
        assert_eq!(point.year, 2021);
    }

    #[test]
    fn test_chart_point_serde_camel_case() {
        let point = ChartPoint::new(2021, "March", 42.0);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["dateKey"], "2021-March");
        assert_eq!(json["label"], "Mar 2021");
        assert_eq!(json["value"], 42.0);
    }

    #[test]
    fn test_drug_entry_serde_camel_case() {
        let entry = DrugEntry {
            name: "Heroin".to_string(),
            full_name: "Heroin (T40.1)".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["fullName"], "Heroin (T40.1)");
    }
}
