//! MRC2014 volumes, read and written through the [mrc] crate.
//!
//! The crate handles byte order, extended headers and compression. This module decides
//! which modes become which [PixelType], reorders samples into X-fastest spatial order,
//! and derives spacing and origin from the header.

use std::path::Path;

use ::mrc::{DataView, Header, HeaderValidationError, Mode, Reader};

use crate::io::{VolumeLoader, VolumeWriter};
use crate::pixel::PixelType;
use crate::volume::{Volume, VoxelData};

fn mrc_error(path: &Path, err: ::mrc::Error) -> crate::Error {
    match err {
        ::mrc::Error::Io(e) => crate::Error::read(path, e),
        ::mrc::Error::InvalidHeaderDetailed(HeaderValidationError::InvalidDimensions {
            nx,
            ny,
            nz,
        }) if nx >= 0 && ny >= 0 && nz >= 0 => crate::Error::EmptyVolume,
        ::mrc::Error::InvalidHeaderDetailed(HeaderValidationError::UnsupportedMode(code)) => {
            crate::Error::unsupported(format!("MRC mode {code}"), "MRC input")
        }
        ::mrc::Error::UnsupportedMode => crate::Error::unsupported("MRC mode", "MRC input"),
        source => crate::Error::InvalidMrc {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Map the file's mode onto a pixel type.
///
/// Mode 0 is read as unsigned bytes unless the IMOD stamp flags them as signed.
fn pixel_type(header: &Header, mode: Mode) -> crate::Result<PixelType> {
    match mode {
        Mode::Int8 if header.detect_imod().is_some_and(|imod| imod.bytes_are_signed) => Err(
            crate::Error::unsupported("MRC mode 0 (signed 8-bit integer)", "MRC input"),
        ),
        Mode::Int8 => Ok(PixelType::UInt8),
        Mode::Int16 => Ok(PixelType::Int16),
        Mode::Uint16 => Ok(PixelType::UInt16),
        Mode::Float32 => Ok(PixelType::Float32),
        other => Err(crate::Error::unsupported(
            format!("MRC mode {}", other.as_i32()),
            "MRC input",
        )),
    }
}

/// Zero-based spatial axis for each of columns, rows and sections.
///
/// A header without a valid permutation of 1, 2, 3 is read as X, Y, Z.
fn axis_order(header: &Header) -> [usize; 3] {
    let map = [header.mapc, header.mapr, header.maps];
    let mut sorted = map;
    sorted.sort_unstable();
    if sorted == [1, 2, 3] {
        map.map(|a| (a - 1) as usize)
    } else {
        log::warn!("invalid MRC axis mapping {map:?}, assuming columns, rows, sections are X, Y, Z");
        [0, 1, 2]
    }
}

/// Physical sample spacing along X, Y, Z: cell length over sampling.
fn spacing(header: &Header, spatial_size: [usize; 3]) -> [f64; 3] {
    let sampling = header.sampling();
    let cell = header.cell_lengths();
    std::array::from_fn(|i| {
        let samples = if sampling[i] > 0 {
            f64::from(sampling[i])
        } else {
            spatial_size[i] as f64
        };
        let length = f64::from(cell[i]);
        if length > 0.0 && length.is_finite() {
            length / samples
        } else {
            log::warn!("MRC cell length {length} along axis {i} is unusable, using spacing 1");
            1.0
        }
    })
}

/// Reorder file-ordered samples into X-fastest spatial order.
fn to_spatial_order<T: Copy>(samples: Vec<T>, file_size: [usize; 3], axes: [usize; 3]) -> Vec<T> {
    if axes == [0, 1, 2] {
        return samples;
    }
    let mut spatial_size = [0usize; 3];
    for (axis, n) in axes.iter().zip(file_size) {
        spatial_size[*axis] = n;
    }
    let stride = [1, spatial_size[0], spatial_size[0] * spatial_size[1]];
    let mut out = samples.clone();
    let mut file_index = 0;
    for s in 0..file_size[2] {
        for r in 0..file_size[1] {
            for c in 0..file_size[0] {
                let target = c * stride[axes[0]] + r * stride[axes[1]] + s * stride[axes[2]];
                out[target] = samples[file_index];
                file_index += 1;
            }
        }
    }
    out
}

/// Build a volume from an opened reader.
fn read_volume(reader: &Reader, source: &Path) -> crate::Result<Volume> {
    let header = reader.header();
    let pixel_type = pixel_type(header, reader.mode())?;
    if reader.is_truncated() {
        return Err(crate::Error::InvalidHeader(format!(
            "MRC data in {} is truncated",
            source.display()
        )));
    }

    let block = reader.read_volume().map_err(|e| mrc_error(source, e))?;
    let voxels = match block.data() {
        DataView::Int8(s) if pixel_type == PixelType::UInt8 => {
            VoxelData::UInt8(s.iter().map(|v| *v as u8).collect())
        }
        DataView::Int16(s) => VoxelData::Int16(s.to_vec()),
        DataView::Uint16(s) => VoxelData::UInt16(s.to_vec()),
        DataView::Float32(s) => VoxelData::Float32(s.to_vec()),
        _ => return Err(crate::Error::unsupported(reader.mode().as_i32(), "MRC input")),
    };

    let shape = reader.shape();
    let file_size = [shape.nx, shape.ny, shape.nz];
    let axes = axis_order(header);
    let voxels = match voxels {
        VoxelData::UInt8(s) => VoxelData::UInt8(to_spatial_order(s, file_size, axes)),
        VoxelData::Int16(s) => VoxelData::Int16(to_spatial_order(s, file_size, axes)),
        VoxelData::UInt16(s) => VoxelData::UInt16(to_spatial_order(s, file_size, axes)),
        VoxelData::Float32(s) => VoxelData::Float32(to_spatial_order(s, file_size, axes)),
    };

    let mut spatial_size = [0usize; 3];
    for (axis, n) in axes.iter().zip(file_size) {
        spatial_size[*axis] = n;
    }
    let spacing = spacing(header, spatial_size);
    let origin = header.origin.map(f64::from);
    Ok(Volume::new(voxels, spatial_size, spacing)?.with_origin(origin))
}

/// Reads `.mrc` files from disk, gzip compressed or not.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrcLoader;

impl VolumeLoader for MrcLoader {
    fn load(&self, source: &Path) -> crate::Result<Volume> {
        let (reader, warnings) =
            Reader::open_permissive(source).map_err(|e| mrc_error(source, e))?;
        for warning in warnings {
            log::warn!("{}: {warning}", source.display());
        }
        let volume = read_volume(&reader, source)?;
        log::info!(
            "loaded {} {} volume of size {:?} and spacing {:?}",
            source.display(),
            volume.pixel_type(),
            volume.size(),
            volume.spacing()
        );
        Ok(volume)
    }
}

/// Writes `.mrc` files to disk.
///
/// `uint8` volumes are stored as mode 0 with the byte values unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrcWriter;

impl VolumeWriter for MrcWriter {
    fn write(&self, volume: &Volume, destination: &Path) -> crate::Result<()> {
        let size = volume.size();
        if size.iter().any(|n| i32::try_from(*n).is_err()) {
            return Err(crate::Error::write(
                destination,
                format!("size {size:?} does not fit an MRC header"),
            ));
        }
        let spacing = volume.spacing();
        let cell: [f32; 3] = std::array::from_fn(|i| (size[i] as f64 * spacing[i]) as f32);
        let builder = ::mrc::create(destination)
            .shape(size)
            .cell_lengths(cell[0], cell[1], cell[2])
            .origin(volume.origin().map(|o| o as f32));
        let write_err = |e: ::mrc::Error| crate::Error::write(destination, e);

        let mut writer = match volume.data() {
            VoxelData::UInt8(s) => {
                let signed: Vec<i8> = s.iter().map(|v| *v as i8).collect();
                let mut writer = builder.mode::<i8>().finish().map_err(write_err)?;
                writer.set_data(signed.as_slice()).map_err(write_err)?;
                writer
            }
            VoxelData::Int16(s) => {
                let mut writer = builder.mode::<i16>().finish().map_err(write_err)?;
                writer.set_data(s.as_slice()).map_err(write_err)?;
                writer
            }
            VoxelData::UInt16(s) => {
                let mut writer = builder.mode::<u16>().finish().map_err(write_err)?;
                writer.set_data(s.as_slice()).map_err(write_err)?;
                writer
            }
            VoxelData::Float32(s) => {
                let mut writer = builder.mode::<f32>().finish().map_err(write_err)?;
                writer.set_data(s.as_slice()).map_err(write_err)?;
                writer
            }
        };
        writer.finalize().map_err(write_err)?;
        log::debug!("wrote {} MRC volume to {}", volume.pixel_type(), destination.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ::mrc::FileEndian;

    use super::*;
    use crate::Error;

    fn ramp_u16() -> Volume {
        let samples: Vec<u16> = (0..24).map(|v| v * 1000).collect();
        Volume::new(samples, [4, 3, 2], [1.5, 2.5, 3.5])
            .unwrap()
            .with_origin([10.0, 20.0, 30.0])
    }

    fn header(size: [i32; 3], mode: i32) -> Header {
        let mut h = Header::new();
        [h.nx, h.ny, h.nz] = size;
        [h.mx, h.my, h.mz] = size;
        h.mode = mode;
        h.xlen = 6.0;
        h.ylen = 7.5;
        h.zlen = 7.0;
        h
    }

    /// Write `header` followed by `data` and load it back.
    fn load_raw(header: &Header, data: &[u8]) -> crate::Result<Volume> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.mrc");
        let mut raw = [0u8; 1024];
        header.encode_to_bytes(&mut raw);
        let mut bytes = raw.to_vec();
        bytes.extend_from_slice(data);
        std::fs::write(&path, bytes).unwrap();
        MrcLoader.load(&path)
    }

    fn le_u16(samples: impl IntoIterator<Item = u16>) -> Vec<u8> {
        samples.into_iter().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn loads_what_it_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.mrc");
        let vol = ramp_u16();
        MrcWriter.write(&vol, &path).unwrap();

        let back = MrcLoader.load(&path).unwrap();
        assert_eq!(back.data(), vol.data());
        assert_eq!(back.size(), vol.size());
        assert_eq!(back.origin(), vol.origin());
        for (a, b) in back.spacing().iter().zip(vol.spacing()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn writer_fills_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.mrc");
        MrcWriter.write(&ramp_u16(), &path).unwrap();

        let reader = ::mrc::open(&path).unwrap();
        let h = reader.header();
        assert_eq!(reader.mode(), Mode::Uint16);
        assert_eq!([h.nx, h.ny, h.nz], [4, 3, 2]);
        assert_eq!(h.cell_lengths(), [6.0, 7.5, 7.0]);
        assert_eq!(h.dmin, 0.0);
        assert_eq!(h.dmax, 23000.0);
    }

    #[test]
    fn unsigned_bytes_survive_mode_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bytes.mrc");
        let vol = Volume::new(vec![0u8, 1, 127, 128, 200, 255, 3, 4], [2, 2, 2], [1.0; 3]).unwrap();
        MrcWriter.write(&vol, &path).unwrap();

        assert_eq!(::mrc::open(&path).unwrap().mode(), Mode::Int8);
        assert_eq!(MrcLoader.load(&path).unwrap().data(), vol.data());
    }

    #[test]
    fn reads_big_endian() {
        let mut h = header([4, 3, 2], 1);
        h.set_file_endian(FileEndian::BigEndian);
        let samples: Vec<i16> = (0..24).map(|v| v * 100 - 300).collect();
        let data: Vec<u8> = samples.iter().flat_map(|v| v.to_be_bytes()).collect();
        let vol = load_raw(&h, &data).unwrap();
        assert_eq!(vol.data(), &VoxelData::Int16(samples));
    }

    #[test]
    fn permuted_axes() {
        // columns are Z, rows are X, sections are Y
        let mut h = header([2, 3, 4], 6);
        [h.mapc, h.mapr, h.maps] = [3, 1, 2];
        let file_samples: Vec<u16> = (0..24).collect();
        let vol = load_raw(&h, &le_u16(file_samples.clone())).unwrap();
        assert_eq!(vol.size(), [3, 4, 2]);
        let VoxelData::UInt16(samples) = vol.data() else {
            panic!("expected uint16");
        };
        // spatial (x=1, y=2, z=1) was file (c=1, r=1, s=2)
        let file_index = 1 + 2 + 2 * 2 * 3;
        let spatial_index = 1 + 2 * 3 + 3 * 4;
        assert_eq!(samples[spatial_index], file_samples[file_index]);
    }

    #[test]
    fn skips_extended_header() {
        let mut h = header([4, 3, 2], 6);
        h.nsymbt = 16;
        let mut data = vec![0xAB; 16];
        data.extend(le_u16((0..24).map(|v| v * 1000)));
        assert_eq!(load_raw(&h, &data).unwrap().data(), ramp_u16().data());
    }

    #[test]
    fn truncated_data() {
        let h = header([4, 3, 2], 6);
        let data = le_u16(0..24);
        assert!(matches!(
            load_raw(&h, &data[..data.len() - 2]).unwrap_err(),
            Error::InvalidHeader(_) | Error::InvalidMrc { .. } | Error::Unreadable { .. }
        ));
    }

    #[test]
    fn unsupported_modes() {
        for code in [3, 4, 12, 101, 42] {
            let h = header([2, 2, 2], code);
            let err = load_raw(&h, &[0u8; 64]).unwrap_err();
            assert!(matches!(err, Error::UnsupportedPixelType { .. }), "mode {code}: {err}");
        }
    }

    #[test]
    fn imod_signed_bytes_are_unsupported() {
        let mut h = header([2, 2, 2], 0);
        h.extra[56..60].copy_from_slice(b"IMOD");
        h.extra[60] = 1;
        assert!(matches!(
            load_raw(&h, &[1u8; 8]).unwrap_err(),
            Error::UnsupportedPixelType { .. }
        ));

        h.extra[60] = 0;
        assert_eq!(load_raw(&h, &[1u8; 8]).unwrap().pixel_type(), PixelType::UInt8);
    }

    #[test]
    fn zero_dimension_is_empty() {
        let h = header([4, 0, 2], 6);
        assert!(matches!(load_raw(&h, &[]).unwrap_err(), Error::EmptyVolume));
    }

    #[test]
    fn zero_cell_falls_back_to_unit_spacing() {
        let mut h = header([4, 3, 2], 6);
        h.xlen = 0.0;
        let vol = load_raw(&h, &le_u16(0..24)).unwrap();
        assert_eq!(vol.spacing(), [1.0, 2.5, 3.5]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MrcLoader.load(&dir.path().join("absent.mrc")).unwrap_err(),
            Error::FileNotFound(_)
        ));
    }
}
