use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use crate::manifest::read_manifest;

/// Collects the distinct lowercase characters of every training label and
/// writes them tab-joined to `save_folder/lexicon`, for use as a model's
/// character-level output vocabulary.
///
/// An already-present lexicon is left untouched; this step is then a no-op.
pub fn create_symbol_file(save_folder: &Path, save_json_train: &Path) -> Result<()> {
    let lexicon_path = save_folder.join("lexicon");
    if lexicon_path.exists() {
        info!("Symbols file present");
        return Ok(());
    }
    info!("Symbols file not present, creating from training data.");

    let mut char_set = BTreeSet::new();
    for (_, entry) in read_manifest(save_json_train)? {
        char_set.extend(entry.label.to_lowercase().chars());
    }

    let joined = char_set
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("\t");
    std::fs::write(&lexicon_path, joined)
        .with_context(|| format!("Failed to write lexicon: {}", lexicon_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRow;
    use crate::manifest::write_manifest;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn write_train_manifest(dir: &Path, labels: &[&str]) -> std::path::PathBuf {
        let catalog: Vec<CatalogRow> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| CatalogRow {
                item_id: format!("LJ001-{:04}", i + 1),
                normalized_label: label.to_string(),
                raw_label: label.to_string(),
            })
            .collect();
        let indices: Vec<usize> = (0..labels.len()).collect();
        let json_path = dir.join("train.json");
        write_manifest(&indices, &json_path, Path::new("wavs"), &catalog, None, true).unwrap();
        json_path
    }

    #[test]
    fn collects_distinct_lowercase_characters() {
        let dir = TempDir::new().unwrap();
        let train_json = write_train_manifest(dir.path(), &["Hello", "World"]);

        create_symbol_file(dir.path(), &train_json).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("lexicon")).unwrap();
        let chars: HashSet<&str> = raw.split('\t').collect();
        let expected: HashSet<&str> = ["h", "e", "l", "o", "w", "r", "d"].into();
        assert_eq!(chars, expected);
    }

    #[test]
    fn existing_lexicon_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let train_json = write_train_manifest(dir.path(), &["abc"]);
        std::fs::write(dir.path().join("lexicon"), "x\ty").unwrap();

        create_symbol_file(dir.path(), &train_json).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("lexicon")).unwrap();
        assert_eq!(raw, "x\ty");
    }
}
