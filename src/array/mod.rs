//! container types for data to be read / written from files
//!
//! Every array that passes through a codec (point coordinates, cell
//! connectivity, named attributes) is stored as a [`DynArray`]: an owned
//! `ndarray` array tagged with its element [`Dtype`]. Codecs decide the dtype
//! at runtime from file headers, so the tag is carried as an enum rather than
//! a type parameter.

mod column;
mod dtype;
mod scalar;

pub(crate) use column::{new_column, Column};
pub(crate) use dtype::{with_byte_order, with_scalar_type};
pub use dtype::{Dtype, Endianness};
pub use scalar::Scalar;

use crate::error::CastError;
use ndarray::{Array, ArrayD, Dimension};

#[derive(Debug, Clone, PartialEq)]
/// An owned n-dimensional array of any supported element type
pub enum DynArray {
    Int8(ArrayD<i8>),
    UInt8(ArrayD<u8>),
    Int16(ArrayD<i16>),
    UInt16(ArrayD<u16>),
    Int32(ArrayD<i32>),
    UInt32(ArrayD<u32>),
    Int64(ArrayD<i64>),
    UInt64(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

/// Evaluate `$body` with `$inner` bound to the typed array inside `$value`
macro_rules! dispatch {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            DynArray::Int8($inner) => $body,
            DynArray::UInt8($inner) => $body,
            DynArray::Int16($inner) => $body,
            DynArray::UInt16($inner) => $body,
            DynArray::Int32($inner) => $body,
            DynArray::UInt32($inner) => $body,
            DynArray::Int64($inner) => $body,
            DynArray::UInt64($inner) => $body,
            DynArray::Float32($inner) => $body,
            DynArray::Float64($inner) => $body,
        }
    };
}

impl<T: Scalar, D: Dimension> From<Array<T, D>> for DynArray {
    fn from(array: Array<T, D>) -> Self {
        T::into_dyn_array(array.into_dyn())
    }
}

impl DynArray {
    /// wrap a typed `ndarray` array of any dimension
    pub fn new<T: Scalar, D: Dimension>(array: Array<T, D>) -> Self {
        Self::from(array)
    }

    /// build a 1-dimensional array from a vector of values
    pub fn from_vec<T: Scalar>(values: Vec<T>) -> Self {
        Self::from(ndarray::Array1::from(values))
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Self::Int8(_) => Dtype::Int8,
            Self::UInt8(_) => Dtype::UInt8,
            Self::Int16(_) => Dtype::Int16,
            Self::UInt16(_) => Dtype::UInt16,
            Self::Int32(_) => Dtype::Int32,
            Self::UInt32(_) => Dtype::UInt32,
            Self::Int64(_) => Dtype::Int64,
            Self::UInt64(_) => Dtype::UInt64,
            Self::Float32(_) => Dtype::Float32,
            Self::Float64(_) => Dtype::Float64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        dispatch!(self, inner => inner.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// total number of elements
    pub fn len(&self) -> usize {
        dispatch!(self, inner => inner.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// length of the first axis (1 for a 0-dimensional array)
    pub fn nrows(&self) -> usize {
        self.shape().first().copied().unwrap_or(1)
    }

    /// length of the second axis (1 for arrays with fewer than two axes)
    pub fn ncols(&self) -> usize {
        self.shape().get(1).copied().unwrap_or(1)
    }

    /// borrow the typed array if the element type is `T`
    pub fn view<T: Scalar>(&self) -> Option<&ArrayD<T>> {
        T::array_ref(self)
    }

    /// convert every element to `T`, failing if any value is not representable
    pub fn cast<T: Scalar>(&self) -> Result<ArrayD<T>, CastError> {
        if let Some(same) = self.view::<T>() {
            return Ok(same.clone());
        }

        dispatch!(self, inner => {
            let mut failed = None;
            let out = inner.mapv(|value| match num_traits::cast::<_, T>(value) {
                Some(converted) => converted,
                None => {
                    failed.get_or_insert_with(|| value.to_string());
                    T::default()
                }
            });

            match failed {
                Some(value) => Err(CastError::new(value, T::DTYPE)),
                None => Ok(out),
            }
        })
    }

    /// dtype-erased version of [`DynArray::cast`]
    pub fn cast_to(&self, dtype: Dtype) -> Result<DynArray, CastError> {
        with_scalar_type!(dtype, T => self.cast::<T>().map(DynArray::from))
    }

    /// append the binary representation of the element at `index`
    ///
    /// `index` must be in bounds for this array's shape
    pub(crate) fn push_bytes(&self, index: &[usize], endian: Endianness, out: &mut Vec<u8>) {
        dispatch!(self, inner => {
            let value = inner[index];
            with_byte_order!(endian, B => value.write::<B>(out))
        })
    }

    /// append the ascii representation of the element at `index`
    ///
    /// `index` must be in bounds for this array's shape
    pub(crate) fn push_ascii(&self, index: &[usize], out: &mut String) {
        dispatch!(self, inner => inner[index].write_ascii(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn shape_and_dtype() {
        let arr = DynArray::new(array![[0i64, 1, 2], [3, 4, 5]]);
        assert_eq!(arr.dtype(), Dtype::Int64);
        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr.nrows(), 2);
        assert_eq!(arr.ncols(), 3);
        assert_eq!(arr.len(), 6);
    }

    #[test]
    fn narrowing_cast() {
        let arr = DynArray::new(array![[0i64, 1], [2, 3]]);
        let narrowed = arr.cast_to(Dtype::Int32).unwrap();
        assert_eq!(narrowed, DynArray::new(array![[0i32, 1], [2, 3]]));
    }

    #[test]
    fn overflowing_cast_fails() {
        let arr = DynArray::from_vec(vec![1i64, i64::from(i32::MAX) + 1]);
        assert!(arr.cast::<i32>().is_err());

        let negative = DynArray::from_vec(vec![-1i32]);
        assert!(negative.cast::<u8>().is_err());
    }

    #[test]
    fn element_encoding() {
        let arr = DynArray::new(array![[1.5f32, -2.0]]);
        let mut bytes = Vec::new();
        arr.push_bytes(&[0, 1], Endianness::Little, &mut bytes);
        assert_eq!(bytes, (-2.0f32).to_le_bytes());

        let mut text = String::new();
        arr.push_ascii(&[0, 0], &mut text);
        assert_eq!(text, "1.5");
    }
}
