//! detail types for the variants of [`Error`](crate::Error)

use crate::prelude::*;

/// The header of a file did not follow the format's grammar
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("expected magic token `{expected}`, got `{actual}`")]
    MissingMagic {
        expected: &'static str,
        actual: String,
    },
    #[error("unrecognized format declaration `{0}`")]
    Format(String),
    #[error("{0}")]
    UnexpectedLine(UnexpectedLine),
    #[error("unknown data type `{0}`")]
    UnknownType(String),
    #[error("could not parse a non-negative element count from `{0}`")]
    InvalidCount(String),
    #[error("element `{0}` is declared more than once")]
    DuplicateElement(String),
    #[error("{0}")]
    UnsupportedProperty(UnsupportedProperty),
    #[error("the first property of element `vertex` must be `x`, got `{0}`")]
    MissingCoordinates(String),
    #[error("header ended before `end_header`")]
    UnexpectedEof,
    #[error("header line is not valid utf-8")]
    Utf8,
}

impl From<UnexpectedLine> for HeaderError {
    fn from(x: UnexpectedLine) -> Self {
        Self::UnexpectedLine(x)
    }
}

impl From<UnsupportedProperty> for HeaderError {
    fn from(x: UnsupportedProperty) -> Self {
        Self::UnsupportedProperty(x)
    }
}

#[derive(Display, Debug)]
#[display(fmt = "unexpected header line. Expected {expected}, got `{actual}`")]
pub struct UnexpectedLine {
    expected: String,
    actual: String,
}

impl UnexpectedLine {
    pub(crate) fn new<T: Into<String>, V: Into<String>>(expected: T, actual: V) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "property `{property}` of element `{element}` is not supported: {reason}")]
pub struct UnsupportedProperty {
    element: String,
    property: String,
    reason: &'static str,
}

/// The data following a valid header could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("unexpected end of data while reading row {row} of element `{element}`")]
    UnexpectedEof { element: String, row: usize },
    #[error("element `{element}` needs {expected} bytes but only {found} remain")]
    Truncated {
        element: String,
        expected: usize,
        found: usize,
    },
    #[error("could not parse `{token}` as {dtype}")]
    InvalidToken { token: String, dtype: Dtype },
    #[error("list record {record} needs {expected} bytes but only {found} remain")]
    TruncatedRecord {
        record: usize,
        expected: usize,
        found: usize,
    },
    #[error("list count `{0}` is negative or does not fit in memory")]
    InvalidListCount(String),
    #[error("row {row} of element `{element}` has {found} values, expected {expected}")]
    RowLength {
        element: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("decoded values do not fit the array layout: {0}")]
    Layout(#[from] ndarray::ShapeError),
}

/// A connectivity array disagrees with the vertex count of its cell type
#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "cells of type `{cell_type}` have {expected} vertices, but the data array has {found} columns"
)]
pub struct ShapeMismatch {
    cell_type: String,
    expected: usize,
    found: usize,
}

/// Neither a format name nor a file extension resolved to a registered codec
#[derive(Debug, thiserror::Error)]
pub enum FormatUnknown {
    #[error("unknown file format `{name}`. Pick one of {known:?}")]
    Name { name: String, known: Vec<String> },
    #[error("could not deduce file format from extension `{0}`")]
    Extension(String),
}

/// A [`Mesh`](crate::Mesh) or [`CellBlock`](crate::CellBlock) violates a
/// shape invariant
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("points must be a 2 dimensional array, got {0} dimensions")]
    PointsDimension(usize),
    #[error("points must have a floating point dtype, got {0}")]
    PointsDtype(Dtype),
    #[error("`{cell_type}` connectivity must be a 2 dimensional array, got {ndim} dimensions")]
    CellsDimension { cell_type: String, ndim: usize },
    #[error("`{cell_type}` connectivity must have an integer dtype, got {dtype}")]
    CellsDtype { cell_type: String, dtype: Dtype },
    #[error("point data `{name}` has {found} rows, expected one per point ({expected})")]
    PointDataRows {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("{kind} `{name}` has {found} blocks, expected one per cell block ({expected})")]
    CellBlocks {
        kind: &'static str,
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("cell data `{name}` block {block} has {found} rows, expected {expected}")]
    CellDataRows {
        name: String,
        block: usize,
        expected: usize,
        found: usize,
    },
}

/// A value could not be converted to a narrower or differently signed dtype
#[derive(Debug, thiserror::Error, Constructor)]
#[error("value `{value}` cannot be represented as {target}")]
pub struct CastError {
    value: String,
    target: Dtype,
}
