mod bootstrap;
mod output;

use anyhow::{bail, Result};
use trends_core::settings::Settings;
use trends_data::series::{series_for_all, series_for_drug};
use trends_runtime::dataset_manager::DatasetManager;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Overdose Trends v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Drug: {}, Format: {}", settings.drug, settings.format);

    // Explicit --data wins; otherwise probe the well-known locations.
    let data_path = match settings.data.clone().or_else(bootstrap::discover_data_path) {
        Some(path) => path,
        None => bail!(
            "no dataset found; pass --data <PATH> or place CSV files under ./data \
             or ~/.overdose-trends/data"
        ),
    };

    let mut manager = DatasetManager::new(data_path);
    let Some(analysis) = manager.get_data(false) else {
        bail!(
            "failed to load dataset from {}: {}",
            manager.data_path().display(),
            manager.last_error().unwrap_or("unknown error")
        );
    };

    if settings.list_drugs {
        let rendered = match settings.format.as_str() {
            "json" => output::render_drug_list_json(&analysis.data.drugs)?,
            _ => output::render_drug_list_text(&analysis.data.drugs),
        };
        print!("{}", rendered);
        if settings.format == "json" {
            println!();
        }
        return Ok(());
    }

    let points = if settings.drug == "All" {
        series_for_all(&analysis.data)
    } else {
        series_for_drug(&analysis.data, &settings.drug)
    };

    if points.is_empty() && !analysis.data.has_drug(&settings.drug) && settings.drug != "All" {
        tracing::warn!(drug = %settings.drug, "drug not present in the catalog");
    }

    let rendered = match settings.format.as_str() {
        "json" => output::render_series_json(&settings.drug, &points)?,
        _ => output::render_series_text(&settings.drug, &points),
    };
    print!("{}", rendered);
    if settings.format == "json" {
        println!();
    }

    Ok(())
}
