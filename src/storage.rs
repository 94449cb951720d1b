//! Chunked array output for the Neuroglancer path.
//!
//! The normalized volume is stored as a Zarr V3 array on the filesystem, dimensions
//! ordered `z, y, x` so that the X-fastest sample buffer is already in C order.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use zarrs::array::codec::GzipCodec;
use zarrs::array::{ArrayBuilder, FillValue, data_type};
use zarrs::filesystem::FilesystemStore;

use crate::io::VolumeWriter;
use crate::volume::{Volume, VoxelData, with_samples};

pub const DEFAULT_CHUNK_SIZE: u64 = 64;
const GZIP_LEVEL: u32 = 5;

/// Writes a volume as a gzip-compressed chunked array rooted at the destination directory.
#[derive(Debug, Clone)]
pub struct ChunkedVolumeWriter {
    chunk_size: u64,
}

impl Default for ChunkedVolumeWriter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkedVolumeWriter {
    /// Cubic chunks with edge `chunk_size`, clipped to the volume size.
    pub fn new(chunk_size: u64) -> crate::Result<Self> {
        if chunk_size == 0 {
            return Err(crate::Error::InvalidOption("chunk size must be positive".into()));
        }
        Ok(Self { chunk_size })
    }

    /// Array shape and chunk shape, both `[z, y, x]`.
    fn shapes(&self, volume: &Volume) -> (Vec<u64>, Vec<u64>) {
        let [nx, ny, nz] = volume.size().map(|n| n as u64);
        let shape = vec![nz, ny, nx];
        let chunk_shape = shape.iter().map(|n| (*n).min(self.chunk_size)).collect();
        (shape, chunk_shape)
    }
}

/// Geometry attributes, listed in the array's `z, y, x` order.
fn attributes(volume: &Volume) -> Map<String, Value> {
    let [sx, sy, sz] = volume.spacing();
    let [ox, oy, oz] = volume.origin();
    let value = json!({
        "pixel_type": volume.pixel_type().name(),
        "spacing": [sz, sy, sx],
        "origin": [oz, oy, ox],
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl VolumeWriter for ChunkedVolumeWriter {
    fn write(&self, volume: &Volume, destination: &Path) -> crate::Result<()> {
        std::fs::create_dir_all(destination).map_err(|e| crate::Error::write(destination, e))?;
        let store = Arc::new(
            FilesystemStore::new(destination).map_err(|e| crate::Error::write(destination, e))?,
        );

        let (shape, chunk_shape) = self.shapes(volume);
        let (dtype, fill_value) = match volume.data() {
            VoxelData::UInt8(_) => (data_type::uint8(), FillValue::from(0u8)),
            VoxelData::Int16(_) => (data_type::int16(), FillValue::from(0i16)),
            VoxelData::UInt16(_) => (data_type::uint16(), FillValue::from(0u16)),
            VoxelData::Float32(_) => (data_type::float32(), FillValue::from(0f32)),
        };
        let gzip = GzipCodec::new(GZIP_LEVEL).map_err(crate::Error::wrap)?;

        let array = ArrayBuilder::new(shape, chunk_shape, dtype, fill_value)
            .bytes_to_bytes_codecs(vec![Arc::new(gzip)])
            .dimension_names(["z", "y", "x"].into())
            .attributes(attributes(volume))
            .build(store, "/")
            .map_err(|e| crate::Error::write(destination, e))?;
        array
            .store_metadata()
            .map_err(|e| crate::Error::write(destination, e))?;

        let subset = array.subset_all();
        with_samples!(volume.data(), samples => array.store_array_subset(&subset, samples.as_slice()))
            .map_err(|e| crate::Error::write(destination, e))?;
        log::info!(
            "wrote {} chunked array of shape {:?} to {}",
            volume.pixel_type(),
            array.shape(),
            destination.display()
        );
        Ok(())
    }
}
