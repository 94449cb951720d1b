//! Pixel type normalization.
//!
//! Each output pipeline accepts a fixed set of input pixel types and maps every one of
//! them to exactly one output type:
//!
//! | input     | Neuroglancer precomputed | NIfTI     |
//! |-----------|--------------------------|-----------|
//! | `uint8`   | `uint8`                  | `uint8`   |
//! | `int16`   | `uint16`                 | `uint16`  |
//! | `uint16`  | `uint16`                 | `uint16`  |
//! | `float32` | unsupported              | `float32` |

use std::fmt;
use std::str::FromStr;

use crate::pixel::PixelType;
use crate::volume::{Volume, VoxelData};

/// Output format a volume is being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    NeuroglancerPrecomputed,
    Nifti,
}

impl Pipeline {
    /// Output pixel type for `input`, or [Error::UnsupportedPixelType](crate::Error::UnsupportedPixelType)
    /// if this pipeline does not accept it.
    pub fn output_type(self, input: PixelType) -> crate::Result<PixelType> {
        use PixelType::*;
        match (self, input) {
            (_, UInt8) => Ok(UInt8),
            (_, Int16) => Ok(UInt16),
            (_, UInt16) => Ok(UInt16),
            (Pipeline::Nifti, Float32) => Ok(Float32),
            (Pipeline::NeuroglancerPrecomputed, Float32) => {
                Err(crate::Error::unsupported(input, self.to_string()))
            }
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipeline::NeuroglancerPrecomputed => f.write_str("neuroglancer precomputed"),
            Pipeline::Nifti => f.write_str("NIfTI"),
        }
    }
}

/// How signed 16-bit samples become unsigned 16-bit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Int16Mapping {
    /// Add 32768: lossless, strictly order-preserving.
    #[default]
    Offset,
    /// Negative samples become 0, the rest are unchanged.
    Clamp,
}

impl Int16Mapping {
    pub fn apply(self, sample: i16) -> u16 {
        match self {
            Int16Mapping::Offset => (i32::from(sample) - i32::from(i16::MIN)) as u16,
            Int16Mapping::Clamp => sample.max(0) as u16,
        }
    }
}

impl FromStr for Int16Mapping {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "offset" => Ok(Int16Mapping::Offset),
            "clamp" => Ok(Int16Mapping::Clamp),
            other => Err(crate::Error::InvalidOption(format!(
                "unknown int16 mapping {other:?}, expected \"offset\" or \"clamp\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub int16_mapping: Int16Mapping,
}

/// Produce a new volume whose pixel type is `pipeline.output_type(volume.pixel_type())`.
///
/// The input volume is left untouched; unchanged types are cloned.
pub fn normalize(
    volume: &Volume,
    pipeline: Pipeline,
    options: &NormalizeOptions,
) -> crate::Result<Volume> {
    use Pipeline::{NeuroglancerPrecomputed, Nifti};

    let input = volume.pixel_type();
    let data = match (pipeline, volume.data()) {
        (NeuroglancerPrecomputed | Nifti, VoxelData::Int16(samples)) => {
            let mapping = options.int16_mapping;
            let clamped = samples.iter().filter(|s| **s < 0).count();
            if mapping == Int16Mapping::Clamp && clamped > 0 {
                log::warn!("clamped {clamped} negative int16 samples to 0");
            }
            VoxelData::UInt16(samples.iter().map(|s| mapping.apply(*s)).collect())
        }
        (NeuroglancerPrecomputed, VoxelData::Float32(_)) => {
            return Err(crate::Error::unsupported(input, pipeline.to_string()));
        }
        (NeuroglancerPrecomputed | Nifti, VoxelData::UInt8(_) | VoxelData::UInt16(_))
        | (Nifti, VoxelData::Float32(_)) => {
            log::debug!("{input} volume needs no conversion for {pipeline}");
            return Ok(volume.clone());
        }
    };
    log::info!("converted {input} volume to {} for {pipeline}", data.pixel_type());
    volume.with_data(data)
}
