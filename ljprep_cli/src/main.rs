use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use ljprep_core::prepare::{PrepareOptions, prepare_ljspeech};
use ljprep_core::split::Split;

fn parse_split(s: &str) -> Result<Split, String> {
    Split::from_str(s)
}

#[derive(Parser, Debug)]
#[command(name = "ljprep")]
#[command(about = "Prepare JSON manifests for the LJSpeech dataset")]
struct Args {
    /// Folder holding metadata.csv and the wavs/ directory
    #[arg(value_name = "DATA_FOLDER")]
    data_folder: PathBuf,

    /// Folder where the manifests are written
    #[arg(value_name = "SAVE_FOLDER")]
    save_folder: PathBuf,

    /// Splits to prepare, comma separated
    #[arg(long, value_delimiter = ',', value_parser = parse_split, default_values_t = [Split::Train, Split::Valid])]
    splits: Vec<Split>,

    /// Integer ratio weights, positionally aligned with --splits
    #[arg(long, value_delimiter = ',', default_values_t = [90u32, 10u32])]
    split_ratio: Vec<u32>,

    /// Seed for the split shuffles
    #[arg(long, default_value_t = 1234)]
    seed: u64,

    /// Skip preparation entirely
    #[arg(long, default_value_t = false)]
    skip_prep: bool,

    /// URL of the duration archive for fastspeech training
    #[arg(long)]
    duration_link: Option<String>,

    /// Write the character inventory of the train split to SAVE_FOLDER/lexicon
    #[arg(long, default_value_t = false)]
    create_symbol_list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let opts = PrepareOptions {
        data_folder: args.data_folder,
        save_folder: args.save_folder,
        splits: args.splits,
        split_ratio: args.split_ratio,
        seed: args.seed,
        skip_prep: args.skip_prep,
        duration_link: args.duration_link,
        create_symbol_list: args.create_symbol_list,
    };
    prepare_ljspeech(&opts)
}
