//! # Stanford polygon file format
//!
//! Reading and writing of `.ply` files containing a `vertex` element and an
//! optional `face` element, in any of the three encodings (`ascii`,
//! `binary_little_endian` and `binary_big_endian`).
//!
//! ## Reading
//!
//! The leading `x`, `y`, `z` vertex properties become the points, every other
//! vertex property becomes a `point_data` array. The single list property of
//! the face element is the connectivity; rows are split into one
//! [`CellBlock`] per row length, and every scalar face property becomes a
//! `cell_data` entry aligned with those blocks.
//!
//! ```
//! let text = "ply\n\
//!     format ascii 1.0\n\
//!     element vertex 3\n\
//!     property float x\n\
//!     property float y\n\
//!     element face 1\n\
//!     property list uchar int vertex_indices\n\
//!     end_header\n\
//!     0 0\n\
//!     1 0\n\
//!     0 1\n\
//!     3 0 1 2\n";
//!
//! let mesh = meshio::ply::read(&mut text.as_bytes()).unwrap();
//!
//! assert_eq!(mesh.points.shape(), &[3, 2]);
//! assert_eq!(mesh.cells[0].cell_type().to_string(), "triangle");
//! ```
//!
//! ## Writing
//!
//! See [`write`]. Only polygonal cell types are written and cell data is
//! dropped; both are reported as [`Warning`]s.

mod ascii;
mod binary;
mod header;
mod write;

use crate::prelude::*;
use crate::registry::{FormatRegistry, ReadMesh, WriteMesh, WriteOptions};
use ndarray::{ArrayView, Axis, IxDyn};
use std::path::Path;

use header::Encoding;

/// registry name of the format
pub const NAME: &str = "ply";

/// type names accepted in a header, including the legacy aliases
const READ_TYPES: &[(&str, Dtype)] = &[
    ("char", Dtype::Int8),
    ("uchar", Dtype::UInt8),
    ("short", Dtype::Int16),
    ("ushort", Dtype::UInt16),
    ("int", Dtype::Int32),
    ("uint", Dtype::UInt32),
    ("float", Dtype::Float32),
    ("double", Dtype::Float64),
    ("int8", Dtype::Int8),
    ("uint8", Dtype::UInt8),
    ("int16", Dtype::Int16),
    ("uint16", Dtype::UInt16),
    ("int32", Dtype::Int32),
    ("uint32", Dtype::UInt32),
    ("int64", Dtype::Int64),
    ("uint64", Dtype::UInt64),
    ("float32", Dtype::Float32),
    ("float64", Dtype::Float64),
];

pub(crate) fn dtype_from_name(name: &str) -> Result<Dtype, HeaderError> {
    READ_TYPES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, dtype)| *dtype)
        .ok_or_else(|| HeaderError::UnknownType(name.into()))
}

/// the type name emitted by the writer
pub(crate) fn type_name(dtype: Dtype) -> &'static str {
    match dtype {
        Dtype::Int8 => "int8",
        Dtype::Int16 => "int16",
        Dtype::Int32 => "int32",
        Dtype::Int64 => "int64",
        Dtype::UInt8 => "uint8",
        Dtype::UInt16 => "uint16",
        Dtype::UInt32 => "uint32",
        Dtype::UInt64 => "uint64",
        Dtype::Float32 => "float",
        Dtype::Float64 => "double",
    }
}

/// one 1 dimensional array per vertex property, in header order
#[derive(Debug, Default)]
pub(crate) struct VertexTable {
    pub(crate) columns: Vec<(String, DynArray)>,
}

/// decoded face element
#[derive(Debug, Default)]
pub(crate) struct FaceTable {
    pub(crate) blocks: Vec<CellBlock>,
    pub(crate) cell_data: BTreeMap<String, Vec<DynArray>>,
}

/// stack 1 dimensional columns into a `(rows, columns.len())` array of `T`
fn stack_columns<T: Scalar>(columns: &[(String, DynArray)]) -> Result<DynArray, Error> {
    let casted = columns
        .iter()
        .map(|(_, column)| column.cast::<T>())
        .collect::<Result<Vec<_>, _>>()?;

    let views: Vec<ArrayView<T, IxDyn>> = casted.iter().map(|column| column.view()).collect();
    let stacked = ndarray::stack(Axis(1), &views).map_err(BodyError::from)?;

    Ok(DynArray::from(stacked))
}

/// split the vertex columns into coordinates and point data
fn split_vertices(table: VertexTable) -> Result<(DynArray, BTreeMap<String, DynArray>), Error> {
    let mut columns = table.columns;

    let num_coordinates = columns
        .iter()
        .zip(["x", "y", "z"])
        .take_while(|((name, _), expected)| name.as_str() == *expected)
        .count();

    let rest = columns.split_off(num_coordinates);

    if columns.is_empty() {
        return Err(HeaderError::MissingCoordinates(String::new()).into());
    }

    let all_single = columns
        .iter()
        .all(|(_, column)| column.dtype() == Dtype::Float32);

    let points = if all_single {
        stack_columns::<f32>(&columns)?
    } else {
        stack_columns::<f64>(&columns)?
    };

    Ok((points, rest.into_iter().collect()))
}

fn assemble(vertices: Option<VertexTable>, faces: Option<FaceTable>) -> Result<Mesh, Error> {
    let (points, point_data) = match vertices {
        Some(table) => split_vertices(table)?,
        None => (DynArray::from(Array2::<f64>::zeros((0, 3))), BTreeMap::new()),
    };

    let faces = faces.unwrap_or_default();

    let data = MeshData {
        point_data,
        cell_data: faces.cell_data,
        ..Default::default()
    };

    Ok(Mesh::from_parts(points, faces.blocks, data)?)
}

/// Read a mesh from an in memory or streamed ply file
pub fn read<R: BufRead + ?Sized>(reader: &mut R) -> Result<Mesh, Error> {
    let header = header::read_header(reader)?;

    log::debug!(
        "read ply header: {:?} encoding with elements {:?}",
        header.encoding,
        header
            .elements
            .iter()
            .map(|element| (element.kind.name(), element.count))
            .collect::<Vec<_>>()
    );

    let (vertices, faces) = match header.encoding {
        Encoding::Ascii => ascii::read_body(reader, &header)?,
        Encoding::Binary(endian) => binary::read_body(reader, &header, endian)?,
    };

    assemble(vertices, faces)
}

/// Read a mesh from a ply file on disk
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Mesh, Error> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    read(&mut reader)
}

/// Write `mesh` as a ply file.
///
/// Points must have at most three coordinates. 64 bit connectivity is cast
/// down to 32 bits in place, so after a successful write `mesh.cells` holds
/// the indices that were actually stored. Everything the format cannot hold
/// is reported in the returned warnings.
pub fn write<W: Write + ?Sized>(
    writer: &mut W,
    mesh: &mut Mesh,
    options: &WriteOptions,
) -> Result<Vec<Warning>, Error> {
    write::write_mesh(writer, mesh, options)
}

/// add the ply reader and writer to `registry`
pub fn register(registry: &mut FormatRegistry) {
    let reader: Box<dyn ReadMesh> = Box::new(|reader: &mut dyn BufRead| read(reader));
    let writer: Box<dyn WriteMesh> = Box::new(
        |writer: &mut dyn Write, mesh: &mut Mesh, options: &WriteOptions| {
            write(writer, mesh, options)
        },
    );

    registry.register(NAME, &[".ply"], Some(reader), vec![(NAME, writer)]);
}
