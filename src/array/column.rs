use super::{with_scalar_type, DynArray, Dtype, Endianness, Scalar};
use crate::error::BodyError;
use ndarray::{ArrayD, IxDyn};

/// A growable, dtype-erased buffer that values are decoded into one at a time.
///
/// Header parsing only tells us the dtype of each property at runtime, so the
/// body decoders hold a `Box<dyn Column>` per property and convert it to a
/// [`DynArray`] once every row has been read.
pub(crate) trait Column {
    fn dtype(&self) -> Dtype;

    fn len(&self) -> usize;

    /// parse an ascii token and append it
    fn push_token(&mut self, token: &str) -> Result<(), BodyError>;

    /// decode a single value from the start of `bytes` and append it
    fn push_bytes(&mut self, bytes: &[u8], endian: Endianness);

    /// move the values into an array of the given shape
    fn finish(self: Box<Self>, shape: &[usize]) -> Result<DynArray, BodyError>;
}

impl<T: Scalar> Column for Vec<T> {
    fn dtype(&self) -> Dtype {
        T::DTYPE
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn push_token(&mut self, token: &str) -> Result<(), BodyError> {
        let value = token
            .parse::<T>()
            .map_err(|_| BodyError::InvalidToken {
                token: token.into(),
                dtype: T::DTYPE,
            })?;
        self.push(value);
        Ok(())
    }

    fn push_bytes(&mut self, bytes: &[u8], endian: Endianness) {
        let value = match endian {
            Endianness::Little => T::read::<byteorder::LittleEndian>(bytes),
            Endianness::Big => T::read::<byteorder::BigEndian>(bytes),
        };
        self.push(value);
    }

    fn finish(self: Box<Self>, shape: &[usize]) -> Result<DynArray, BodyError> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), *self)?;
        Ok(DynArray::from(array))
    }
}

/// allocate an empty column for values of `dtype`
pub(crate) fn new_column(dtype: Dtype, capacity: usize) -> Box<dyn Column> {
    with_scalar_type!(dtype, T => Box::new(Vec::<T>::with_capacity(capacity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_typed() {
        let mut column = new_column(Dtype::UInt8, 2);
        column.push_token("7").unwrap();
        assert!(column.push_token("-1").is_err());
        assert!(column.push_token("1.5").is_err());
        assert_eq!(column.len(), 1);
        assert_eq!(column.finish(&[1]).unwrap(), DynArray::from_vec(vec![7u8]));
    }

    #[test]
    fn finish_checks_shape() {
        let mut column = new_column(Dtype::Float64, 3);
        column.push_bytes(&1.0f64.to_be_bytes(), Endianness::Big);
        column.push_bytes(&2.0f64.to_le_bytes(), Endianness::Little);
        assert_eq!(column.dtype(), Dtype::Float64);
        assert!(column.finish(&[2, 2]).is_err());
    }
}
