//! conversion between rust primitives and their dtype / byte representations

use super::{DynArray, Dtype};
use byteorder::ByteOrder;
use ndarray::ArrayD;
use num_traits::NumCast;
use std::fmt::{Debug, Display, Write as _};
use std::str::FromStr;

/// A primitive that can be stored in a [`DynArray`]
pub trait Scalar:
    Copy + Debug + Display + FromStr + NumCast + PartialEq + Default + Send + Sync + 'static
{
    const DTYPE: Dtype;

    /// decode a single value from the start of `bytes`. `bytes` must hold
    /// at least `Self::DTYPE.size()` bytes
    fn read<B: ByteOrder>(bytes: &[u8]) -> Self;

    /// append the binary representation of this value
    fn write<B: ByteOrder>(self, out: &mut Vec<u8>);

    /// append the ascii representation of this value
    fn write_ascii(self, out: &mut String) {
        // writing to a string cannot fail
        let _ = write!(out, "{self}");
    }

    fn into_dyn_array(array: ArrayD<Self>) -> DynArray;

    fn array_ref(array: &DynArray) -> Option<&ArrayD<Self>>;
}

impl Scalar for i8 {
    const DTYPE: Dtype = Dtype::Int8;

    fn read<B: ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    fn write<B: ByteOrder>(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    fn into_dyn_array(array: ArrayD<Self>) -> DynArray {
        DynArray::Int8(array)
    }

    fn array_ref(array: &DynArray) -> Option<&ArrayD<Self>> {
        match array {
            DynArray::Int8(inner) => Some(inner),
            _ => None,
        }
    }
}

impl Scalar for u8 {
    const DTYPE: Dtype = Dtype::UInt8;

    fn read<B: ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn write<B: ByteOrder>(self, out: &mut Vec<u8>) {
        out.push(self);
    }

    fn into_dyn_array(array: ArrayD<Self>) -> DynArray {
        DynArray::UInt8(array)
    }

    fn array_ref(array: &DynArray) -> Option<&ArrayD<Self>> {
        match array {
            DynArray::UInt8(inner) => Some(inner),
            _ => None,
        }
    }
}

macro_rules! impl_scalar {
    ($ty:ident, $variant:ident, $read:ident, $write:ident) => {
        impl Scalar for $ty {
            const DTYPE: Dtype = Dtype::$variant;

            fn read<B: ByteOrder>(bytes: &[u8]) -> Self {
                B::$read(bytes)
            }

            fn write<B: ByteOrder>(self, out: &mut Vec<u8>) {
                let mut buffer = [0; std::mem::size_of::<$ty>()];
                B::$write(&mut buffer, self);
                out.extend_from_slice(&buffer);
            }

            impl_scalar!(@ascii $ty);

            fn into_dyn_array(array: ArrayD<Self>) -> DynArray {
                DynArray::$variant(array)
            }

            fn array_ref(array: &DynArray) -> Option<&ArrayD<Self>> {
                match array {
                    DynArray::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
    // floats are written with the shortest representation that parses back to
    // the same value
    (@ascii f32) => {
        fn write_ascii(self, out: &mut String) {
            let mut buffer = ryu::Buffer::new();
            out.push_str(buffer.format(self));
        }
    };
    (@ascii f64) => {
        fn write_ascii(self, out: &mut String) {
            let mut buffer = ryu::Buffer::new();
            out.push_str(buffer.format(self));
        }
    };
    (@ascii $ty:ident) => {};
}

impl_scalar!(i16, Int16, read_i16, write_i16);
impl_scalar!(u16, UInt16, read_u16, write_u16);
impl_scalar!(i32, Int32, read_i32, write_i32);
impl_scalar!(u32, UInt32, read_u32, write_u32);
impl_scalar!(i64, Int64, read_i64, write_i64);
impl_scalar!(u64, UInt64, read_u64, write_u64);
impl_scalar!(f32, Float32, read_f32, write_f32);
impl_scalar!(f64, Float64, read_f64, write_f64);

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn byte_order_is_respected() {
        let mut out = Vec::new();
        0x0102_i16.write::<BigEndian>(&mut out);
        0x0102_i16.write::<LittleEndian>(&mut out);
        assert_eq!(out, [1, 2, 2, 1]);
        assert_eq!(i16::read::<BigEndian>(&out[0..2]), 0x0102);
        assert_eq!(i16::read::<LittleEndian>(&out[2..4]), 0x0102);
    }

    #[test]
    fn ascii_floats_are_shortest() {
        let mut out = String::new();
        0.1f32.write_ascii(&mut out);
        out.push(' ');
        3i32.write_ascii(&mut out);
        assert_eq!(out, "0.1 3");
    }
}
