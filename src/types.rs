use std::fmt::{Display, Formatter};

use num_traits::{NumCast, ToPrimitive, Zero};

/// Sample data types supported by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RasterDataType {
    U8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl RasterDataType {
    pub fn name(&self) -> &'static str {
        match self {
            RasterDataType::U8 => "Byte",
            RasterDataType::U16 => "UInt16",
            RasterDataType::I16 => "Int16",
            RasterDataType::U32 => "UInt32",
            RasterDataType::I32 => "Int32",
            RasterDataType::F32 => "Float32",
            RasterDataType::F64 => "Float64",
        }
    }

    /// Size of one sample in **bytes**.
    pub fn bytes(&self) -> u8 {
        match self {
            RasterDataType::U8 => 1,
            RasterDataType::U16 | RasterDataType::I16 => 2,
            RasterDataType::U32 | RasterDataType::I32 | RasterDataType::F32 => 4,
            RasterDataType::F64 => 8,
        }
    }

    /// Size of one sample in **bits**.
    pub fn bits(&self) -> u8 {
        self.bytes() * 8
    }

    /// Returns `true` if the data type is integral (non-floating point).
    pub fn is_integer(&self) -> bool {
        !self.is_floating()
    }

    /// Returns `true` if the data type is floating point.
    pub fn is_floating(&self) -> bool {
        matches!(self, RasterDataType::F32 | RasterDataType::F64)
    }

    /// Returns `true` if the data type supports negative values.
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            RasterDataType::I16 | RasterDataType::I32 | RasterDataType::F32 | RasterDataType::F64
        )
    }

    pub fn available_types() -> &'static [RasterDataType] {
        use RasterDataType::*;
        &[U8, U16, I16, U32, I32, F32, F64]
    }
}

impl Display for RasterDataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-level constraint for the primitive numeric values a raster may hold.
///
/// The comparison against a nodata sentinel lives here so that the floating
/// point implementations can treat NaN sentinels correctly (`NaN == NaN` is
/// false under IEEE comparison, but a NaN sentinel must still match NaN
/// samples).
pub trait Pixel: Copy + PartialEq + PartialOrd + ToPrimitive + NumCast + Zero + 'static {
    fn raster_type() -> RasterDataType;

    /// Widen to `f64` for accumulation. Exact for every supported integral
    /// type and `f32`; the identity for `f64`.
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    /// Narrow from an `f64`, returning `None` when the value does not fit.
    fn from_f64(value: f64) -> Option<Self> {
        num_traits::cast(value)
    }

    /// Compare against a raster's declared nodata sentinel. `None` means no
    /// sentinel is declared, so every sample is valid.
    fn is_nodata(self, nodata: Option<Self>) -> bool {
        match nodata {
            Some(sentinel) => self == sentinel,
            None => false,
        }
    }
}

impl Pixel for u8 {
    fn raster_type() -> RasterDataType {
        RasterDataType::U8
    }
}

impl Pixel for u16 {
    fn raster_type() -> RasterDataType {
        RasterDataType::U16
    }
}

impl Pixel for i16 {
    fn raster_type() -> RasterDataType {
        RasterDataType::I16
    }
}

impl Pixel for u32 {
    fn raster_type() -> RasterDataType {
        RasterDataType::U32
    }
}

impl Pixel for i32 {
    fn raster_type() -> RasterDataType {
        RasterDataType::I32
    }
}

impl Pixel for f32 {
    fn raster_type() -> RasterDataType {
        RasterDataType::F32
    }

    fn is_nodata(self, nodata: Option<Self>) -> bool {
        match nodata {
            Some(sentinel) if sentinel.is_nan() => self.is_nan(),
            Some(sentinel) => self == sentinel,
            None => false,
        }
    }
}

impl Pixel for f64 {
    fn raster_type() -> RasterDataType {
        RasterDataType::F64
    }

    fn is_nodata(self, nodata: Option<Self>) -> bool {
        match nodata {
            Some(sentinel) if sentinel.is_nan() => self.is_nan(),
            Some(sentinel) => self == sentinel,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors() {
        assert_eq!(<u8 as Pixel>::raster_type().name(), "Byte");
        assert_eq!(<i16 as Pixel>::raster_type().bytes(), 2);
        assert_eq!(<f32 as Pixel>::raster_type().bits(), 32);
        assert!(<f64 as Pixel>::raster_type().is_floating());
        assert!(<u32 as Pixel>::raster_type().is_integer());
        assert!(<i32 as Pixel>::raster_type().is_signed());
        assert!(!<u16 as Pixel>::raster_type().is_signed());
        assert_eq!(RasterDataType::available_types().len(), 7);
    }

    #[test]
    fn test_nodata_comparison() {
        assert!((-1i16).is_nodata(Some(-1)));
        assert!(!(-1i16).is_nodata(None));
        assert!(!5i16.is_nodata(Some(-1)));
    }

    #[test]
    fn test_nan_nodata() {
        assert!(f64::NAN.is_nodata(Some(f64::NAN)));
        assert!(!1.0f64.is_nodata(Some(f64::NAN)));
        assert!((-9999.0f32).is_nodata(Some(-9999.0)));
        assert!(!f32::NAN.is_nodata(Some(-9999.0)));
    }

    #[test]
    fn test_f64_widening() {
        assert_eq!(255u8.as_f64(), 255.0);
        assert_eq!((-32768i16).as_f64(), -32768.0);
        assert_eq!(i16::from_f64(12.0), Some(12));
        assert_eq!(u8::from_f64(-1.0), None);
    }
}
