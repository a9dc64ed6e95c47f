use crate::prelude::*;

/// Element type of a [`DynArray`](crate::DynArray)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum Dtype {
    #[display(fmt = "int8")]
    Int8,
    #[display(fmt = "uint8")]
    UInt8,
    #[display(fmt = "int16")]
    Int16,
    #[display(fmt = "uint16")]
    UInt16,
    #[display(fmt = "int32")]
    Int32,
    #[display(fmt = "uint32")]
    UInt32,
    #[display(fmt = "int64")]
    Int64,
    #[display(fmt = "uint64")]
    UInt64,
    #[display(fmt = "float32")]
    Float32,
    #[display(fmt = "float64")]
    Float64,
}

impl Dtype {
    /// number of bytes a single element occupies in a binary stream
    pub fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

/// Byte order of a binary payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Endianness {
    #[display(fmt = "little")]
    Little,
    #[display(fmt = "big")]
    Big,
}

impl Endianness {
    /// byte order of the machine we are running on
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

/// Run `$body` with `$t` bound as a type alias for the scalar type of `$dtype`
macro_rules! with_scalar_type {
    ($dtype:expr, $t:ident => $body:expr) => {
        match $dtype {
            $crate::Dtype::Int8 => {
                type $t = i8;
                $body
            }
            $crate::Dtype::UInt8 => {
                type $t = u8;
                $body
            }
            $crate::Dtype::Int16 => {
                type $t = i16;
                $body
            }
            $crate::Dtype::UInt16 => {
                type $t = u16;
                $body
            }
            $crate::Dtype::Int32 => {
                type $t = i32;
                $body
            }
            $crate::Dtype::UInt32 => {
                type $t = u32;
                $body
            }
            $crate::Dtype::Int64 => {
                type $t = i64;
                $body
            }
            $crate::Dtype::UInt64 => {
                type $t = u64;
                $body
            }
            $crate::Dtype::Float32 => {
                type $t = f32;
                $body
            }
            $crate::Dtype::Float64 => {
                type $t = f64;
                $body
            }
        }
    };
}

/// Run `$body` with `$b` bound to the `byteorder` marker type for `$endian`
macro_rules! with_byte_order {
    ($endian:expr, $b:ident => $body:expr) => {
        match $endian {
            $crate::Endianness::Little => {
                type $b = byteorder::LittleEndian;
                $body
            }
            $crate::Endianness::Big => {
                type $b = byteorder::BigEndian;
                $body
            }
        }
    };
}

pub(crate) use with_byte_order;
pub(crate) use with_scalar_type;
