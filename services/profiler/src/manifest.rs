//! Batch manifests listing the storm cells to profile.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storm_common::{timestamp_from_filename, Polygon};

/// One storm cell at one timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Family name as assigned by the tracker.
    pub name: String,

    /// Observation time. Taken from the CAPPI file name when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    pub cappi_path: PathBuf,

    /// Cell outline as `[[lon, lat], ...]`.
    pub polygon: Polygon,

    /// JSON array of `{"lon", "lat"}` strokes observed during this scan.
    #[serde(default)]
    pub lightning_path: Option<PathBuf>,
}

impl ManifestEntry {
    /// Timestamp of this entry, falling back to the CAPPI file name.
    pub fn resolve_timestamp(&self) -> Result<DateTime<Utc>> {
        if let Some(ts) = self.timestamp {
            return Ok(ts);
        }
        let file_name = self
            .cappi_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        timestamp_from_filename(file_name)
            .with_context(|| format!("No timestamp for cell {}", self.name))
    }
}

/// Read a JSON manifest. Relative paths are resolved against the manifest's directory.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest from {:?}", path))?;
    let mut entries: Vec<ManifestEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse manifest from {:?}", path))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for entry in &mut entries {
        entry.cappi_path = resolve(base, &entry.cappi_path);
        if let Some(lightning) = entry.lightning_path.take() {
            entry.lightning_path = Some(resolve(base, &lightning));
        }
    }

    Ok(entries)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{fixtures, temp_test_dir, write_test_file};

    #[test]
    fn test_relative_paths_and_filename_timestamp() {
        let dir = temp_test_dir();
        let manifest = format!(
            r#"[{{
                "name": "{}",
                "cappi_path": "{}",
                "polygon": [[-60.5, -3.5], [-59.5, -3.5], [-59.5, -2.5], [-60.5, -2.5]],
                "lightning_path": "/data/strokes.json"
            }}]"#,
            fixtures::cells::CELL_NAME,
            fixtures::time::REFERENCE_FILE
        );
        let path = write_test_file(dir.path(), "manifest.json", manifest);

        let entries = load_manifest(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].cappi_path,
            dir.path().join(fixtures::time::REFERENCE_FILE)
        );
        assert_eq!(
            entries[0].lightning_path.as_deref(),
            Some(Path::new("/data/strokes.json"))
        );

        let ts = entries[0].resolve_timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2014-03-02T14:24:00+00:00");
    }

    #[test]
    fn test_degenerate_polygon_is_rejected() {
        let json = r#"[{"name": "x", "cappi_path": "a.dat", "polygon": [[0, 0], [1, 1]]}]"#;
        assert!(serde_json::from_str::<Vec<ManifestEntry>>(json).is_err());
    }

    #[test]
    fn test_missing_timestamp_everywhere() {
        let entry: ManifestEntry = serde_json::from_str(
            r#"{"name": "x", "cappi_path": "volume.dat", "polygon": [[0, 0], [1, 0], [1, 1]]}"#,
        )
        .unwrap();
        assert!(entry.resolve_timestamp().is_err());
    }
}
