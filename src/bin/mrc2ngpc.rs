use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mrcconvert::convert::mrc_to_ngpc;
use mrcconvert::mrc::MrcLoader;
use mrcconvert::policy::{Int16Mapping, NormalizeOptions};
use mrcconvert::range::{Bound, RANGE_METADATA_FILE_NAME, RangeOptions};
use mrcconvert::storage::{ChunkedVolumeWriter, DEFAULT_CHUNK_SIZE};

/// Convert an MRC volume to a chunked array and record its Neuroglancer display range.
///
/// The range is written as JSON with the keys neuroglancerPrecomputedMin,
/// neuroglancerPrecomputedMax, neuroglancerPrecomputedFloor and
/// neuroglancerPrecomputedLimit, each holding a decimal string.
#[derive(Parser, Debug)]
#[command(name = "mrc2ngpc", version)]
struct Cli {
    /// Input MRC file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory for the chunked volume (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// How signed 16-bit samples become unsigned: "offset" (add 32768) or "clamp"
    #[arg(long = "int16", value_name = "MAPPING", default_value = "offset")]
    int16_mapping: Int16Mapping,

    /// Use this percentile of the samples as the floor instead of the type minimum
    #[arg(long, value_name = "P")]
    floor_percentile: Option<f64>,

    /// Use this percentile of the samples as the limit instead of the type maximum
    #[arg(long, value_name = "P")]
    limit_percentile: Option<f64>,

    /// Where to write the range JSON
    #[arg(long, value_name = "PATH", default_value = RANGE_METADATA_FILE_NAME)]
    metadata_file: PathBuf,

    /// Edge length of the cubic chunks
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: u64,

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

fn bound(percentile: Option<f64>) -> Bound {
    percentile.map_or(Bound::TypeExtreme, Bound::Percentile)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let writer = ChunkedVolumeWriter::new(cli.chunk_size)?;
    let normalize_options = NormalizeOptions {
        int16_mapping: cli.int16_mapping,
    };
    let range_options = RangeOptions {
        floor: bound(cli.floor_percentile),
        limit: bound(cli.limit_percentile),
    };

    mrc_to_ngpc(
        MrcLoader,
        writer,
        &cli.input,
        &cli.output_dir,
        &cli.metadata_file,
        &normalize_options,
        &range_options,
    )
    .with_context(|| format!("failed to convert {}", cli.input.display()))?;
    Ok(())
}
