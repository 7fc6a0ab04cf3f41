use anyhow::{Context, Result};
use std::path::Path;

/// One row of metadata.csv, in file order: `item_id|normalized_label|raw_label`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CatalogRow {
    pub item_id: String,
    pub normalized_label: String,
    pub raw_label: String,
}

impl CatalogRow {
    /// Recording-session prefix: everything before the first `-` in the item
    /// id (the whole id when there is no `-`).
    pub fn session_prefix(&self) -> &str {
        self.item_id.split('-').next().unwrap_or(&self.item_id)
    }
}

/// Reads the pipe-delimited, quote-free metadata file. Row order in the
/// returned list is the canonical index space for splitting.
pub fn load_catalog(meta_csv: &Path) -> Result<Vec<CatalogRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quoting(false)
        .from_path(meta_csv)
        .with_context(|| format!("Failed to open metadata: {}", meta_csv.display()))?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<CatalogRow>() {
        let row = result.context("Failed to parse a metadata row")?;
        rows.push(row);
    }
    Ok(rows)
}
