//! Convert MRC volumes for downstream viewers.
//!
//! Two pipelines share one shape: an [io::VolumeLoader] reads a [volume::Volume], the
//! [policy] module maps its pixel type onto one the target format accepts, and an
//! [io::VolumeWriter] stores the result.
//!
//! - [convert::mrc_to_nifti] writes a NIfTI-1 file.
//! - [convert::mrc_to_ngpc] writes a chunked array plus a JSON sidecar holding the
//!   display range Neuroglancer needs.
pub mod convert;
mod error;
pub mod io;
pub mod mrc;
pub mod nii;
pub mod pixel;
pub mod policy;
pub mod range;
pub mod storage;
pub mod volume;

pub use error::{Error, Result};
pub use pixel::PixelType;
pub use volume::{Volume, VoxelData};
pub use zarrs;
