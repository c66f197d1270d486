//! Terminal and JSON rendering of query results.

use serde::Serialize;
use trends_core::formatting::format_number;
use trends_core::models::{ChartPoint, DrugEntry};

// ── Series rendering ───────────────────────────────────────────────────────────

/// JSON payload for a rendered series.
#[derive(Serialize)]
struct SeriesDocument<'a> {
    drug: &'a str,
    points: &'a [ChartPoint],
}

/// Render a monthly series as an aligned two-column table.
pub fn render_series_text(drug: &str, points: &[ChartPoint]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Overdose deaths – {}\n", drug));

    if points.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let label_width = points.iter().map(|p| p.label.len()).max().unwrap_or(0);
    for point in points {
        out.push_str(&format!(
            "  {:<width$}  {:>10}\n",
            point.label,
            format_number(point.value, 0),
            width = label_width,
        ));
    }
    out
}

/// Render a monthly series as pretty-printed JSON.
pub fn render_series_json(drug: &str, points: &[ChartPoint]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SeriesDocument { drug, points })
}

// ── Drug catalog rendering ─────────────────────────────────────────────────────

/// Render the drug catalog, one drug per line with its full indicator name.
pub fn render_drug_list_text(drugs: &[DrugEntry]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Drugs ({})\n", drugs.len()));

    let name_width = drugs.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for drug in drugs {
        if drug.full_name == drug.name {
            out.push_str(&format!("  {}\n", drug.name));
        } else {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                drug.name,
                drug.full_name,
                width = name_width,
            ));
        }
    }
    out
}

/// Render the drug catalog as pretty-printed JSON.
pub fn render_drug_list_json(drugs: &[DrugEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(drugs)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
