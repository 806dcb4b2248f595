//! Batch profiling of manifest entries.
//!
//! Entries sharing a CAPPI file are grouped so each volume is decoded once.
//! Groups run in parallel on a dedicated rayon pool. A failing cell is
//! logged and skipped; it never aborts the batch.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use cappi_reader::{read_cappi, CappiVolume};
use profile_processor::{MaskedVolume, ProfileRecord, VerticalProfileAggregator};
use rayon::prelude::*;
use storm_lifecycle::{count_strikes, Stroke};
use tracing::{debug, info, warn};

use crate::config::ProfilerConfig;
use crate::manifest::ManifestEntry;

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records in manifest order, failed entries omitted.
    pub records: Vec<ProfileRecord>,
    pub processed: usize,
    pub failed: usize,
}

pub struct ProfileBatch<'a> {
    config: &'a ProfilerConfig,
    aggregator: VerticalProfileAggregator,
}

impl<'a> ProfileBatch<'a> {
    pub fn new(config: &'a ProfilerConfig) -> Result<Self> {
        let aggregator = VerticalProfileAggregator::new(config.aggregator.clone())
            .context("Failed to create aggregator")?;
        Ok(Self { config, aggregator })
    }

    /// Profile every entry of a manifest.
    pub fn run(&self, entries: &[ManifestEntry]) -> Result<BatchReport> {
        let mut groups: BTreeMap<&Path, Vec<usize>> = BTreeMap::new();
        for (index, entry) in entries.iter().enumerate() {
            groups.entry(entry.cappi_path.as_path()).or_default().push(index);
        }
        let groups: Vec<(&Path, Vec<usize>)> = groups.into_iter().collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.batch.workers)
            .build()
            .context("Failed to build worker pool")?;

        info!(
            cells = entries.len(),
            volumes = groups.len(),
            workers = pool.current_num_threads(),
            "Starting profile batch"
        );

        let mut results: Vec<(usize, Option<ProfileRecord>)> = pool.install(|| {
            groups
                .par_iter()
                .flat_map_iter(|(path, indices)| self.run_group(path, indices, entries))
                .collect()
        });
        results.sort_by_key(|(index, _)| *index);

        let mut report = BatchReport::default();
        for (_, record) in results {
            match record {
                Some(record) => {
                    report.records.push(record);
                    report.processed += 1;
                }
                None => report.failed += 1,
            }
        }

        info!(
            processed = report.processed,
            failed = report.failed,
            "Profile batch complete"
        );
        Ok(report)
    }

    fn run_group(
        &self,
        path: &Path,
        indices: &[usize],
        entries: &[ManifestEntry],
    ) -> Vec<(usize, Option<ProfileRecord>)> {
        let volume = match read_cappi(path, &self.config.radar) {
            Ok(volume) => volume,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    cells = indices.len(),
                    "Failed to read CAPPI volume"
                );
                return indices.iter().map(|&i| (i, None)).collect();
            }
        };

        indices
            .iter()
            .map(|&index| {
                let entry = &entries[index];
                match self.profile_cell(&volume, entry) {
                    Ok(record) => (index, Some(record)),
                    Err(e) => {
                        warn!(
                            cell = %entry.name,
                            path = %path.display(),
                            error = %e,
                            "Skipping cell"
                        );
                        (index, None)
                    }
                }
            })
            .collect()
    }

    /// Aggregate one cell out of an already decoded volume.
    pub fn profile_cell(
        &self,
        volume: &CappiVolume,
        entry: &ManifestEntry,
    ) -> Result<ProfileRecord> {
        let timestamp = entry.resolve_timestamp()?;

        let windowed;
        let source = if self.config.batch.window_to_cell {
            windowed = volume.window(&entry.polygon.bbox())?;
            &windowed
        } else {
            volume
        };

        let mask = source.footprint(&entry.polygon)?;
        let masked = MaskedVolume::new(Arc::clone(&source.volume), mask)?;
        let summary = self.aggregator.aggregate(&masked)?;

        let lightning = match &entry.lightning_path {
            Some(path) => Some(count_strikes(&entry.polygon, &load_strokes(path)?)),
            None => None,
        };

        let record =
            ProfileRecord::from_summary(&entry.name, timestamp, &summary, self.aggregator.config())?
                .with_lightning(lightning);

        debug!(
            cell = %entry.name,
            %timestamp,
            max_vil = record.maxvil_kgm2,
            echotop_40 = record.echotop_40,
            ?lightning,
            "Profiled cell"
        );
        Ok(record)
    }
}

fn load_strokes(path: &Path) -> Result<Vec<Stroke>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lightning strokes from {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse lightning strokes from {:?}", path))
}

/// Write records as JSON lines.
pub fn write_records(path: &Path, records: &[ProfileRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
