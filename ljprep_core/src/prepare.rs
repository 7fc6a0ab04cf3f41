use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

use crate::catalog::load_catalog;
use crate::lexicon::create_symbol_file;
use crate::manifest::write_manifest;
use crate::split::{Split, split_sets};

pub const OPT_FILE: &str = "opt_ljspeech_prepare.pkl";
pub const METADATA_CSV: &str = "metadata.csv";
pub const WAVS: &str = "wavs";
pub const DURATIONS: &str = "durations";

const DURATIONS_ARCHIVE: &str = "ljspeech_DFA_durations.zip";

/// Configuration record persisted alongside the manifests. A later run with a
/// field-equal record and all manifests in place skips preparation entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareConfig {
    pub data_folder: PathBuf,
    pub splits: Vec<Split>,
    pub split_ratio: Vec<u32>,
    pub save_folder: PathBuf,
    pub seed: u64,
}

/// Caller-facing parameters for one preparation run.
///
/// `split_ratio` is positionally aligned with `splits` by convention; the
/// lengths are not cross-checked.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub data_folder: PathBuf,
    pub save_folder: PathBuf,
    pub splits: Vec<Split>,
    pub split_ratio: Vec<u32>,
    pub seed: u64,
    pub skip_prep: bool,
    pub duration_link: Option<String>,
    pub create_symbol_list: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::new(),
            save_folder: PathBuf::new(),
            splits: vec![Split::Train, Split::Valid],
            split_ratio: vec![90, 10],
            seed: 1234,
            skip_prep: false,
            duration_link: None,
            create_symbol_list: false,
        }
    }
}

/// Prepares the JSON manifests for the LJSpeech dataset.
///
/// Reads `<data_folder>/metadata.csv`, splits rows across the requested
/// subsets per recording session, and writes one manifest per split into
/// `save_folder`, plus the persisted config record and (optionally) the
/// lexicon file.
pub fn prepare_ljspeech(opts: &PrepareOptions) -> Result<()> {
    if opts.skip_prep {
        return Ok(());
    }

    let conf = PrepareConfig {
        data_folder: opts.data_folder.clone(),
        splits: opts.splits.clone(),
        split_ratio: opts.split_ratio.clone(),
        save_folder: opts.save_folder.clone(),
        seed: opts.seed,
    };

    if !opts.save_folder.exists() {
        std::fs::create_dir_all(&opts.save_folder).with_context(|| {
            format!("Failed to create save folder: {}", opts.save_folder.display())
        })?;
    }

    let meta_csv = opts.data_folder.join(METADATA_CSV);
    let wavs_folder = opts.data_folder.join(WAVS);
    let save_opt = opts.save_folder.join(OPT_FILE);

    let durations_folder = match &opts.duration_link {
        Some(link) => Some(fetch_durations(&opts.data_folder, link)),
        None => None,
    };

    if skip(&opts.splits, &opts.save_folder, &conf) {
        info!("Skipping preparation, completed in previous run.");
        return Ok(());
    }

    ensure!(meta_csv.exists(), "metadata.csv does not exist");
    ensure!(wavs_folder.exists(), "wavs/ folder does not exist");

    info!("Creating json file for ljspeech Dataset..");

    let meta_csv = load_catalog(&meta_csv)?;
    let data_split = split_sets(&meta_csv, &opts.splits, &opts.split_ratio, opts.seed);

    for split in Split::ALL {
        let Some(indices) = data_split.get(&split) else {
            continue;
        };
        write_manifest(
            indices,
            &opts.save_folder.join(split.json_file()),
            &wavs_folder,
            &meta_csv,
            durations_folder.as_deref(),
            split == Split::Train,
        )?;
    }

    if opts.create_symbol_list {
        create_symbol_file(&opts.save_folder, &opts.save_folder.join(Split::Train.json_file()))?;
    }

    save_config(&conf, &save_opt)?;
    Ok(())
}

/// Detects whether a previous run already produced the requested manifests
/// under an identical configuration. Read-only; a missing or unreadable
/// config record always forces a re-run.
pub fn skip(splits: &[Split], save_folder: &Path, conf: &PrepareConfig) -> bool {
    for split in splits {
        if !save_folder.join(split.json_file()).is_file() {
            return false;
        }
    }

    let save_opt = save_folder.join(OPT_FILE);
    match load_config(&save_opt) {
        Some(opts_old) => opts_old == *conf,
        None => false,
    }
}

fn save_config(conf: &PrepareConfig, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to write config record: {}", path.display()))?;
    serde_json::to_writer(file, conf)?;
    Ok(())
}

fn load_config(path: &Path) -> Option<PrepareConfig> {
    let file = File::open(path).ok()?;
    serde_json::from_reader(file).ok()
}

/// Downloads and unpacks the auxiliary duration data next to the dataset,
/// unless `<data_folder>/durations` already exists. The external commands run
/// fire-and-forget: a failed download surfaces only as dangling `.npy` paths
/// in the manifests, which are never validated.
fn fetch_durations(data_folder: &Path, link: &str) -> PathBuf {
    let durations_folder = data_folder.join(DURATIONS);
    if !durations_folder.exists() {
        info!("Downloading durations for fastspeech training");
        let _ = Command::new("wget").args(["-q", link]).status();
        let _ = Command::new("unzip").args(["-qq", DURATIONS_ARCHIVE]).status();
        let _ = Command::new("mv")
            .arg(DURATIONS)
            .arg(&durations_folder)
            .status();
        let _ = Command::new("rm").args(["-r", DURATIONS_ARCHIVE]).status();
    }
    durations_folder
}
