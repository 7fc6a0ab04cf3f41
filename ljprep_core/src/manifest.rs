use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::catalog::CatalogRow;

/// Attributes recorded per item in a split manifest. Paths are recorded as
/// given; nothing checks that the wav or durations file exists on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub wav: String,
    pub label: String,
    pub segment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durations: Option<String>,
}

/// Writes one split's manifest: a JSON object mapping item id to its
/// attributes, keys in index-processing order, overwriting any existing file.
///
/// `segment` is true only for the training split. `durations_folder`, when
/// set, attaches a `<durations_folder>/<item_id>.npy` path to every entry.
pub fn write_manifest(
    indices: &[usize],
    json_path: &Path,
    wavs_folder: &Path,
    catalog: &[CatalogRow],
    durations_folder: Option<&Path>,
    segment: bool,
) -> Result<()> {
    let mut json_dict = serde_json::Map::new();
    for &index in indices {
        let row = &catalog[index];
        let wav = wavs_folder.join(format!("{}.wav", row.item_id));
        let entry = ManifestEntry {
            wav: wav.to_string_lossy().into_owned(),
            label: row.raw_label.clone(),
            segment,
            durations: durations_folder.map(|folder| {
                folder
                    .join(format!("{}.npy", row.item_id))
                    .to_string_lossy()
                    .into_owned()
            }),
        };
        json_dict.insert(row.item_id.clone(), serde_json::to_value(entry)?);
    }

    let file = File::create(json_path)
        .with_context(|| format!("Failed to create manifest: {}", json_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &json_dict)?;

    info!("{} successfully created!", json_path.display());
    Ok(())
}

/// Reads a manifest back into an id → entry map, preserving file order.
pub fn read_manifest(json_path: &Path) -> Result<Vec<(String, ManifestEntry)>> {
    let file = File::open(json_path)
        .with_context(|| format!("Failed to open manifest: {}", json_path.display()))?;
    let json_dict: serde_json::Map<String, serde_json::Value> =
        serde_json::from_reader(std::io::BufReader::new(file))?;

    let mut entries = Vec::with_capacity(json_dict.len());
    for (id, value) in json_dict {
        let entry: ManifestEntry = serde_json::from_value(value)
            .with_context(|| format!("Malformed manifest entry '{id}'"))?;
        entries.push((id, entry));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn make_catalog(n: usize) -> Vec<CatalogRow> {
        (0..n)
            .map(|i| CatalogRow {
                item_id: format!("LJ001-{:04}", i + 1),
                normalized_label: format!("normalized {i}"),
                raw_label: format!("raw {i}"),
            })
            .collect()
    }

    #[test]
    fn writes_entries_in_index_order_with_wav_paths() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("valid.json");
        let catalog = make_catalog(4);
        let wavs = PathBuf::from("/data/wavs");

        write_manifest(&[2, 0], &json_path, &wavs, &catalog, None, false).unwrap();

        let entries = read_manifest(&json_path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "LJ001-0003");
        assert_eq!(entries[1].0, "LJ001-0001");
        assert_eq!(entries[0].1.wav, "/data/wavs/LJ001-0003.wav");
        assert!(!entries[0].1.segment);
        assert!(entries[0].1.durations.is_none());
    }

    #[test]
    fn durations_field_is_omitted_when_unset() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("train.json");
        let catalog = make_catalog(1);

        write_manifest(&[0], &json_path, Path::new("wavs"), &catalog, None, true).unwrap();
        let raw = std::fs::read_to_string(&json_path).unwrap();
        assert!(!raw.contains("durations"));
        assert!(raw.contains("\"segment\": true"));
    }

    #[test]
    fn durations_path_is_attached_when_configured() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("train.json");
        let catalog = make_catalog(1);

        write_manifest(
            &[0],
            &json_path,
            Path::new("wavs"),
            &catalog,
            Some(Path::new("/data/durations")),
            true,
        )
        .unwrap();

        let entries = read_manifest(&json_path).unwrap();
        assert_eq!(
            entries[0].1.durations.as_deref(),
            Some("/data/durations/LJ001-0001.npy")
        );
    }
}
