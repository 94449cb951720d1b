use crate::pixel::PixelType;

/// Typed sample buffer, x varying fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelData {
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Float32(Vec<f32>),
}

/// Apply `$body` to the buffer of whichever variant `$data` holds.
macro_rules! with_samples {
    ($data:expr, $samples:ident => $body:expr) => {
        match $data {
            $crate::volume::VoxelData::UInt8($samples) => $body,
            $crate::volume::VoxelData::Int16($samples) => $body,
            $crate::volume::VoxelData::UInt16($samples) => $body,
            $crate::volume::VoxelData::Float32($samples) => $body,
        }
    };
}
pub(crate) use with_samples;

impl VoxelData {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            VoxelData::UInt8(_) => PixelType::UInt8,
            VoxelData::Int16(_) => PixelType::Int16,
            VoxelData::UInt16(_) => PixelType::UInt16,
            VoxelData::Float32(_) => PixelType::Float32,
        }
    }

    pub fn len(&self) -> usize {
        with_samples!(self, s => s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_from_vec {
    ($t:ty, $variant:ident) => {
        impl From<Vec<$t>> for VoxelData {
            fn from(value: Vec<$t>) -> Self {
                VoxelData::$variant(value)
            }
        }
    };
}

impl_from_vec!(u8, UInt8);
impl_from_vec!(i16, Int16);
impl_from_vec!(u16, UInt16);
impl_from_vec!(f32, Float32);

/// A loaded 3D volume. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: VoxelData,
    /// (x, y, z) sample counts.
    size: [usize; 3],
    /// Physical distance between samples along (x, y, z).
    spacing: [f64; 3],
    origin: [f64; 3],
}

impl Volume {
    /// Validate and assemble a volume.
    ///
    /// Fails with [Error::EmptyVolume](crate::Error::EmptyVolume) if any dimension is zero,
    /// and with [Error::InvalidHeader](crate::Error::InvalidHeader) if the sample count does
    /// not match the size or a spacing component is not a positive finite number.
    pub fn new(data: impl Into<VoxelData>, size: [usize; 3], spacing: [f64; 3]) -> crate::Result<Self> {
        let data = data.into();
        if size.contains(&0) {
            return Err(crate::Error::EmptyVolume);
        }
        let expected = size
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| crate::Error::InvalidHeader(format!("volume size {size:?} overflows")))?;
        if data.len() != expected {
            return Err(crate::Error::InvalidHeader(format!(
                "volume of size {size:?} needs {expected} samples, got {}",
                data.len()
            )));
        }
        if let Some(s) = spacing.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(crate::Error::InvalidHeader(format!(
                "spacing must be strictly positive, got {s} in {spacing:?}"
            )));
        }
        Ok(Self {
            data,
            size,
            spacing,
            origin: [0.0; 3],
        })
    }

    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Same geometry, different samples. Sample count must match.
    pub(crate) fn with_data(&self, data: VoxelData) -> crate::Result<Self> {
        Ok(Self::new(data, self.size, self.spacing)?.with_origin(self.origin))
    }

    pub fn data(&self) -> &VoxelData {
        &self.data
    }

    pub fn pixel_type(&self) -> PixelType {
        self.data.pixel_type()
    }

    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    pub fn num_samples(&self) -> usize {
        self.data.len()
    }
}
