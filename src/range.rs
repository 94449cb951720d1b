//! Scalar range metadata for the Neuroglancer precomputed path.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pixel::Sample;
use crate::volume::{Volume, with_samples};

/// Default name of the range sidecar, written to the working directory.
pub const RANGE_METADATA_FILE_NAME: &str = "mrc2ngpc-output.json";

/// Display range of a volume, every value as its decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeMetadata {
    #[serde(rename = "neuroglancerPrecomputedMin")]
    pub min: String,
    #[serde(rename = "neuroglancerPrecomputedMax")]
    pub max: String,
    #[serde(rename = "neuroglancerPrecomputedFloor")]
    pub floor: String,
    #[serde(rename = "neuroglancerPrecomputedLimit")]
    pub limit: String,
}

/// Where a display bound comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Bound {
    /// The pixel type's lowest (for floor) or highest (for limit) representable value.
    #[default]
    TypeExtreme,
    /// Nearest-rank percentile of the samples, in `[0, 100]`.
    Percentile(f64),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RangeOptions {
    pub floor: Bound,
    pub limit: Bound,
}

impl RangeOptions {
    pub fn validate(&self) -> crate::Result<()> {
        for bound in [self.floor, self.limit] {
            if let Bound::Percentile(p) = bound {
                if !(0.0..=100.0).contains(&p) {
                    return Err(crate::Error::InvalidOption(format!(
                        "percentile must be within [0, 100], got {p}"
                    )));
                }
            }
        }
        if let (Bound::Percentile(lo), Bound::Percentile(hi)) = (self.floor, self.limit) {
            if lo > hi {
                return Err(crate::Error::InvalidOption(format!(
                    "floor percentile {lo} is above limit percentile {hi}"
                )));
            }
        }
        Ok(())
    }
}

/// Compute min, max, floor and limit over every sample of `volume`.
///
/// NaN samples are ignored. Fails with [Error::EmptyVolume](crate::Error::EmptyVolume)
/// if no comparable sample remains.
pub fn derive_range(volume: &Volume, options: &RangeOptions) -> crate::Result<RangeMetadata> {
    options.validate()?;
    let range = with_samples!(volume.data(), samples => derive_typed(samples, options))?;
    log::info!(
        "{} range: min {} max {} floor {} limit {}",
        volume.pixel_type(),
        range.min,
        range.max,
        range.floor,
        range.limit
    );
    Ok(range)
}

fn derive_typed<T: Sample>(samples: &[T], options: &RangeOptions) -> crate::Result<RangeMetadata> {
    let mut comparable = samples.iter().copied().filter(|s| s.is_comparable());
    let first = comparable.next().ok_or(crate::Error::EmptyVolume)?;
    let (min, max) = comparable.fold((first, first), |(lo, hi), s| {
        (if s < lo { s } else { lo }, if s > hi { s } else { hi })
    });

    let mut sorted = None;
    let mut resolve = |bound: Bound, extreme: T| match bound {
        Bound::TypeExtreme => extreme,
        Bound::Percentile(p) => {
            let sorted = sorted.get_or_insert_with(|| sorted_samples(samples));
            nearest_rank(sorted, p)
        }
    };
    let floor = resolve(options.floor, T::LOWEST);
    let limit = resolve(options.limit, T::HIGHEST);

    Ok(RangeMetadata {
        min: min.to_string(),
        max: max.to_string(),
        floor: floor.to_string(),
        limit: limit.to_string(),
    })
}

fn sorted_samples<T: Sample>(samples: &[T]) -> Vec<T> {
    let mut sorted: Vec<T> = samples.iter().copied().filter(|s| s.is_comparable()).collect();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// `sorted` must be non-empty.
fn nearest_rank<T: Sample>(sorted: &[T], percentile: f64) -> T {
    let n = sorted.len();
    let rank = (percentile / 100.0 * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

/// Write `metadata` as a JSON object to `path`, replacing any existing file.
pub fn write_range_metadata(metadata: &RangeMetadata, path: &Path) -> crate::Result<()> {
    let file = File::create(path).map_err(|e| crate::Error::write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, metadata).map_err(|e| crate::Error::write(path, e))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| crate::Error::write(path, e))?;
    log::info!("wrote range metadata to {}", path.display());
    Ok(())
}
