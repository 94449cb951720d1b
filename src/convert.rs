//! The two conversion pipelines: load, normalize, then write.

use std::path::Path;

use crate::io::{VolumeLoader, VolumeWriter};
use crate::policy::{NormalizeOptions, Pipeline, normalize};
use crate::range::{RangeMetadata, RangeOptions, derive_range, write_range_metadata};
use crate::volume::Volume;

/// Load `input`, normalize it for NIfTI, and write it to `output`.
///
/// Returns the volume as written.
pub fn mrc_to_nifti<L: VolumeLoader, W: VolumeWriter>(
    loader: L,
    writer: W,
    input: &Path,
    output: &Path,
    options: &NormalizeOptions,
) -> crate::Result<Volume> {
    let volume = loader.load(input)?;
    let normalized = normalize(&volume, Pipeline::Nifti, options)?;
    writer.write(&normalized, output)?;
    Ok(normalized)
}

/// Load `input`, normalize it for Neuroglancer, write the volume to `output_dir` and
/// its range metadata to `metadata_path`.
///
/// The range is derived before anything is written, so an empty or unsupported volume
/// leaves no output behind.
pub fn mrc_to_ngpc<L: VolumeLoader, W: VolumeWriter>(
    loader: L,
    writer: W,
    input: &Path,
    output_dir: &Path,
    metadata_path: &Path,
    normalize_options: &NormalizeOptions,
    range_options: &RangeOptions,
) -> crate::Result<RangeMetadata> {
    range_options.validate()?;
    let volume = loader.load(input)?;
    let normalized = normalize(&volume, Pipeline::NeuroglancerPrecomputed, normalize_options)?;
    let range = derive_range(&normalized, range_options)?;
    writer.write(&normalized, output_dir)?;
    write_range_metadata(&range, metadata_path)?;
    Ok(range)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use super::*;
    use crate::Error;
    use crate::pixel::PixelType;
    use crate::volume::VoxelData;

    struct MemoryLoader(Volume);

    impl VolumeLoader for MemoryLoader {
        fn load(&self, _source: &Path) -> crate::Result<Volume> {
            Ok(self.0.clone())
        }
    }

    struct FailingLoader;

    impl VolumeLoader for FailingLoader {
        fn load(&self, source: &Path) -> crate::Result<Volume> {
            Err(Error::FileNotFound(source.to_path_buf()))
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        written: RefCell<Vec<(PathBuf, Volume)>>,
    }

    impl VolumeWriter for RecordingWriter {
        fn write(&self, volume: &Volume, destination: &Path) -> crate::Result<()> {
            self.written
                .borrow_mut()
                .push((destination.to_path_buf(), volume.clone()));
            Ok(())
        }
    }

    fn volume(data: VoxelData) -> Volume {
        Volume::new(data, [2, 2, 1], [1.1e-7, 1.2e-7, 1.3e-7]).unwrap()
    }

    #[test]
    fn nifti_pipeline_normalizes_before_writing() {
        let writer = RecordingWriter::default();
        let loader = MemoryLoader(volume(VoxelData::Int16(vec![-1, 0, 1, 2])));
        let out = mrc_to_nifti(
            &loader,
            &writer,
            Path::new("in.mrc"),
            Path::new("out.nii"),
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(out.pixel_type(), PixelType::UInt16);

        let written = writer.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("out.nii"));
        assert_eq!(written[0].1, out);
    }

    #[test]
    fn loader_errors_propagate() {
        let writer = RecordingWriter::default();
        let err = mrc_to_nifti(
            FailingLoader,
            &writer,
            Path::new("missing.mrc"),
            Path::new("out.nii"),
            &NormalizeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(writer.written.borrow().is_empty());
    }

    #[test]
    fn ngpc_rejects_float_without_writing() {
        let writer = RecordingWriter::default();
        let dir = std::env::temp_dir().join("mrcconvert-unit-ngpc-float");
        let metadata = dir.join("never.json");
        let err = mrc_to_ngpc(
            MemoryLoader(volume(VoxelData::Float32(vec![0.0; 4]))),
            &writer,
            Path::new("in.mrc"),
            &dir,
            &metadata,
            &NormalizeOptions::default(),
            &RangeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedPixelType { .. }));
        assert!(writer.written.borrow().is_empty());
        assert!(!metadata.exists());
    }
}
