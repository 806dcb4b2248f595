//! Lifecycle summaries for tracked families.

use std::path::Path;

use anyhow::{Context, Result};
use storm_lifecycle::{summarize_family, ClassificationConfig, Family, FamilySummary};
use tracing::{info, warn};

/// Read a JSON array of families from `path`.
pub fn load_families(path: &Path) -> Result<Vec<Family>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read families from {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse families from {:?}", path))
}

/// Summarize every family, skipping the ones that cannot be summarized.
pub fn summarize_all(families: &[Family], config: &ClassificationConfig) -> Vec<FamilySummary> {
    let summaries: Vec<FamilySummary> = families
        .iter()
        .filter_map(|family| match summarize_family(family, config) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(family = %family.name, error = %e, "Skipping family");
                None
            }
        })
        .collect();

    info!(
        families = families.len(),
        summarized = summaries.len(),
        "Lifecycle summaries complete"
    );
    summaries
}

pub fn write_summaries(path: &Path, summaries: &[FamilySummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(summaries)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}
