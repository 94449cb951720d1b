use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mrcconvert::convert::mrc_to_nifti;
use mrcconvert::mrc::MrcLoader;
use mrcconvert::nii::{NiftiWriter, with_nifti_extension};
use mrcconvert::policy::{Int16Mapping, NormalizeOptions};

/// Convert an MRC volume to a NIfTI-1 file, keeping its size and spacing.
///
/// Signed 16-bit input is written as unsigned 16-bit; 8-bit, unsigned 16-bit and
/// 32-bit float input keep their pixel type.
#[derive(Parser, Debug)]
#[command(name = "mrc2nifti", version)]
struct Cli {
    /// Input MRC file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file; ".nii" is appended unless it ends in .nii or .nii.gz
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// How signed 16-bit samples become unsigned: "offset" (add 32768) or "clamp"
    #[arg(long = "int16", value_name = "MAPPING", default_value = "offset")]
    int16_mapping: Int16Mapping,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = with_nifti_extension(&cli.output);
    let options = NormalizeOptions {
        int16_mapping: cli.int16_mapping,
    };
    mrc_to_nifti(MrcLoader, NiftiWriter, &cli.input, &output, &options)
        .with_context(|| format!("failed to convert {}", cli.input.display()))?;
    Ok(())
}
