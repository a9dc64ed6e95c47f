//! Common imports used throughout the crate
#![allow(unused_imports)]

pub(crate) use crate::array::{DynArray, Dtype, Endianness, Scalar};
pub(crate) use crate::array::{new_column, with_byte_order, with_scalar_type, Column};
pub(crate) use crate::error::{BodyError, HeaderError, MeshError};
pub(crate) use crate::mesh::{CellBlock, CellType, Mesh, MeshData};
pub(crate) use crate::warning::{warn, Warning};
pub(crate) use crate::Error;

pub(crate) use std::collections::BTreeMap;
pub(crate) use std::io::{BufRead, Write};

pub(crate) use derive_more::{Constructor, Display, From};

pub(crate) use ndarray::{Array1, Array2, ArrayD};
