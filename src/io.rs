//! Capabilities the conversion pipelines are built from.
//!
//! Decoding and encoding of concrete file formats sits behind these traits so that the
//! normalization and range logic can run against in-memory volumes.

use std::path::Path;

use crate::volume::Volume;

/// Reads a volume from a path.
pub trait VolumeLoader {
    fn load(&self, source: &Path) -> crate::Result<Volume>;
}

/// Writes a volume to a path, replacing whatever was there.
pub trait VolumeWriter {
    fn write(&self, volume: &Volume, destination: &Path) -> crate::Result<()>;
}

impl<L: VolumeLoader + ?Sized> VolumeLoader for &L {
    fn load(&self, source: &Path) -> crate::Result<Volume> {
        (**self).load(source)
    }
}

impl<W: VolumeWriter + ?Sized> VolumeWriter for &W {
    fn write(&self, volume: &Volume, destination: &Path) -> crate::Result<()> {
        (**self).write(volume, destination)
    }
}
