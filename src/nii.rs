//! NIfTI-1 output through the `nifti` crate.

use std::path::{Path, PathBuf};

use ndarray::{Array3, ShapeBuilder};
use nifti::NiftiHeader;
use nifti::writer::WriterOptions;

use crate::io::VolumeWriter;
use crate::volume::{Volume, with_samples};

/// NIFTI_XFORM_SCANNER_ANAT
const XFORM_SCANNER_ANAT: i16 = 1;

/// Append `.nii` unless `path` already ends in `.nii` or `.nii.gz`.
pub fn with_nifti_extension(path: &Path) -> PathBuf {
    let name = path.to_string_lossy();
    if name.ends_with(".nii") || name.ends_with(".nii.gz") {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("{name}.nii"))
    }
}

/// Header carrying the geometry of `volume`. Size and data type are filled in by the
/// writer from the array itself.
fn reference_header(volume: &Volume) -> NiftiHeader {
    let [sx, sy, sz] = volume.spacing().map(|s| s as f32);
    let [ox, oy, oz] = volume.origin().map(|o| o as f32);
    NiftiHeader {
        pixdim: [1.0, sx, sy, sz, 0.0, 0.0, 0.0, 0.0],
        qform_code: XFORM_SCANNER_ANAT,
        quatern_b: 0.0,
        quatern_c: 0.0,
        quatern_d: 0.0,
        quatern_x: ox,
        quatern_y: oy,
        quatern_z: oz,
        sform_code: XFORM_SCANNER_ANAT,
        srow_x: [sx, 0.0, 0.0, ox],
        srow_y: [0.0, sy, 0.0, oy],
        srow_z: [0.0, 0.0, sz, oz],
        ..Default::default()
    }
}

/// Samples are X-fastest, which is Fortran order over an (x, y, z) shape.
fn to_array<T: Clone>(samples: &[T], size: [usize; 3]) -> crate::Result<Array3<T>> {
    Array3::from_shape_vec((size[0], size[1], size[2]).f(), samples.to_vec())
        .map_err(crate::Error::wrap)
}

/// Writes single-file NIfTI-1 volumes; a destination ending in `.gz` is compressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiWriter;

impl VolumeWriter for NiftiWriter {
    fn write(&self, volume: &Volume, destination: &Path) -> crate::Result<()> {
        let header = reference_header(volume);
        let options = WriterOptions::new(destination).reference_header(&header);
        let size = volume.size();
        with_samples!(volume.data(), samples => options.write_nifti(&to_array(samples, size)?))
            .map_err(|e| crate::Error::write(destination, e))?;
        log::info!(
            "wrote {} NIfTI volume of size {:?} to {}",
            volume.pixel_type(),
            size,
            destination.display()
        );
        Ok(())
    }
}
