#![allow(dead_code)]

use std::path::{Path, PathBuf};

use mrcconvert::io::VolumeWriter;
use mrcconvert::mrc::MrcWriter;
use mrcconvert::{PixelType, Volume, VoxelData};
use tempfile::TempDir;

pub const SIZE: [usize; 3] = [10, 9, 8];
pub const SPACING: [f64; 3] = [1.1e-7, 1.2e-7, 1.3e-7];

pub fn workdir() -> TempDir {
    env_logger::try_init().ok();
    tempfile::tempdir().expect("create temp dir")
}

/// A ramp volume of the requested pixel type, spanning negative values for int16.
pub fn ramp(pixel_type: PixelType) -> Volume {
    let n: usize = SIZE.iter().product();
    let data = match pixel_type {
        PixelType::UInt8 => VoxelData::UInt8((0..n).map(|i| (i % 251) as u8).collect()),
        PixelType::Int16 => VoxelData::Int16((0..n).map(|i| i as i16 * 7 - 2000).collect()),
        PixelType::UInt16 => VoxelData::UInt16((0..n).map(|i| i as u16 * 60).collect()),
        PixelType::Float32 => VoxelData::Float32((0..n).map(|i| i as f32 * 0.25 - 3.0).collect()),
    };
    Volume::new(data, SIZE, SPACING).expect("valid fixture volume")
}

/// Write `volume` as `<name>.mrc` inside `dir`.
pub fn write_mrc(dir: &Path, name: &str, volume: &Volume) -> PathBuf {
    let path = dir.join(format!("{name}.mrc"));
    MrcWriter.write(volume, &path).expect("write fixture mrc");
    path
}

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = expected.abs() * 1e-7;
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} is not within {tolerance} of {expected}"
    );
}
