//! Scalar sample encodings a [Volume](crate::volume::Volume) can hold.

use std::fmt;

/// Pixel type of a loaded volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    UInt8,
    Int16,
    UInt16,
    Float32,
}

impl PixelType {
    pub const ALL: [PixelType; 4] = [
        PixelType::UInt8,
        PixelType::Int16,
        PixelType::UInt16,
        PixelType::Float32,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PixelType::UInt8 => "uint8",
            PixelType::Int16 => "int16",
            PixelType::UInt16 => "uint16",
            PixelType::Float32 => "float32",
        }
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(self, PixelType::UInt8 | PixelType::UInt16)
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust scalar type backing one [PixelType].
pub trait Sample: Copy + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static {
    const PIXEL_TYPE: PixelType;
    /// Smallest representable value.
    const LOWEST: Self;
    /// Largest representable value.
    const HIGHEST: Self;

    fn to_f64(self) -> f64;

    /// False only for NaN.
    fn is_comparable(self) -> bool {
        true
    }
}

macro_rules! impl_sample {
    ($t:ty, $pixel_type:expr) => {
        impl Sample for $t {
            const PIXEL_TYPE: PixelType = $pixel_type;
            const LOWEST: Self = <$t>::MIN;
            const HIGHEST: Self = <$t>::MAX;

            fn to_f64(self) -> f64 {
                f64::from(self)
            }
        }
    };
}

impl_sample!(u8, PixelType::UInt8);
impl_sample!(i16, PixelType::Int16);
impl_sample!(u16, PixelType::UInt16);

impl Sample for f32 {
    const PIXEL_TYPE: PixelType = PixelType::Float32;
    const LOWEST: Self = f32::MIN;
    const HIGHEST: Self = f32::MAX;

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn is_comparable(self) -> bool {
        !self.is_nan()
    }
}
