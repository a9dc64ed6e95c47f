//! # meshio
//!
//! Reading and writing of unstructured meshes.
//!
//! A [`Mesh`] holds floating point point coordinates, a list of [`CellBlock`]s
//! (one connectivity array per cell type) and named data arrays. Codecs are
//! looked up by name or file extension in a [`FormatRegistry`]; the functions
//! at the crate root use the builtin registry.
//!
//! ```
//! use meshio::{CellBlock, Mesh, WriteOptions};
//! use ndarray::array;
//!
//! let points = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
//! let cells = vec![CellBlock::new("triangle", array![[0i32, 1, 2]]).unwrap()];
//! let mut mesh = Mesh::new(points, cells).unwrap();
//!
//! let mut buffer = Vec::new();
//! let warnings = meshio::write_stream(&mut buffer, &mut mesh, "ply", &WriteOptions::ascii()).unwrap();
//! assert!(warnings.is_empty());
//!
//! let read_back = meshio::read_stream(&mut buffer.as_slice(), "ply").unwrap();
//! assert_eq!(read_back, mesh);
//! ```
//!
//! ## Ragged lists
//!
//! Formats such as ply store polygon connectivity as a sequence of records
//! that each start with their own vertex count. The [`ragged`] module decodes
//! these in a single pass into one block per run of equal length records.

pub mod array;
pub mod error;
pub mod mesh;
pub mod ply;
pub(crate) mod prelude;
pub mod ragged;
pub mod registry;
mod warning;

pub use array::{DynArray, Dtype, Endianness, Scalar};
pub use mesh::{CellBlock, CellType, Mesh, MeshData};
pub use registry::{FormatRegistry, ReadMesh, WriteMesh, WriteOptions};
pub use warning::Warning;

pub use ndarray;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("file `{}` does not exist", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    FormatUnknown(#[from] error::FormatUnknown),
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] error::HeaderError),
    #[error("malformed data: {0}")]
    MalformedBody(#[from] error::BodyError),
    #[error("`{0}` is not a valid cell type key. Expected `polygon<N>`")]
    MalformedKey(String),
    #[error("{0}")]
    ShapeMismatch(error::ShapeMismatch),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] error::MeshError),
    #[error(transparent)]
    Cast(#[from] error::CastError),
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
}

/// Read the mesh stored at `path` with the builtin formats.
///
/// The format is inferred from the file extension unless `format` is given.
pub fn read<P: AsRef<Path>>(path: P, format: Option<&str>) -> Result<Mesh, Error> {
    FormatRegistry::builtin().read(path, format)
}

/// Read a mesh of `format` from an open stream with the builtin formats.
pub fn read_stream(stream: &mut dyn BufRead, format: &str) -> Result<Mesh, Error> {
    FormatRegistry::builtin().read_stream(stream, format)
}

/// Write `mesh` to `path` with the builtin formats, returning the warnings
/// raised by the writer.
pub fn write<P: AsRef<Path>>(
    path: P,
    mesh: &mut Mesh,
    format: Option<&str>,
    options: &WriteOptions,
) -> Result<Vec<Warning>, Error> {
    FormatRegistry::builtin().write(path, mesh, format, options)
}

/// Write `mesh` as `format` to an open stream with the builtin formats.
pub fn write_stream(
    stream: &mut dyn Write,
    mesh: &mut Mesh,
    format: &str,
    options: &WriteOptions,
) -> Result<Vec<Warning>, Error> {
    FormatRegistry::builtin().write_stream(stream, mesh, format, options)
}

/// Assemble a [`Mesh`] from its parts and write it to `path`.
pub fn write_points_cells<P, A>(
    path: P,
    points: A,
    cells: Vec<CellBlock>,
    data: MeshData,
    format: Option<&str>,
    options: &WriteOptions,
) -> Result<Vec<Warning>, Error>
where
    P: AsRef<Path>,
    A: Into<DynArray>,
{
    let mut mesh = Mesh::from_parts(points, cells, data)?;
    write(path, &mut mesh, format, options)
}
