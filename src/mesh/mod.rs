//! # Mesh Information
//!
//! A [`Mesh`] is the in-memory representation every codec reads into and
//! writes from. It holds the point coordinates, an ordered list of
//! [`CellBlock`]s and named attribute arrays:
//!
//! * `point_data`: one array per name with a row for every point
//! * `cell_data`: one array per name *per cell block*, aligned with `cells`
//! * `field_data`: mesh-global arrays
//! * `point_sets` / `cell_sets`: named index sets (cell sets are per block)
//!
//! Shape invariants are checked by [`Mesh::new`], [`Mesh::from_parts`] and
//! [`Mesh::validate`]. Cell type specific invariants (a `quad` has four vertex
//! indices per row) are only checked when writing, since readers are allowed
//! to produce custom cell types.

mod cell;

pub use cell::{CellBlock, CellType};

use crate::prelude::*;

/// Attribute arrays and index sets attached to a [`Mesh`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub point_data: BTreeMap<String, DynArray>,
    pub cell_data: BTreeMap<String, Vec<DynArray>>,
    pub field_data: BTreeMap<String, DynArray>,
    pub point_sets: BTreeMap<String, Vec<usize>>,
    pub cell_sets: BTreeMap<String, Vec<Vec<usize>>>,
}

#[derive(Debug, Clone, PartialEq)]
/// An unstructured mesh with attached data
pub struct Mesh {
    /// `(num_points, dim)` floating point coordinates
    pub points: DynArray,
    pub cells: Vec<CellBlock>,
    pub point_data: BTreeMap<String, DynArray>,
    pub cell_data: BTreeMap<String, Vec<DynArray>>,
    pub field_data: BTreeMap<String, DynArray>,
    pub point_sets: BTreeMap<String, Vec<usize>>,
    pub cell_sets: BTreeMap<String, Vec<Vec<usize>>>,
}

impl Mesh {
    /// create a mesh without any attached data
    pub fn new<P: Into<DynArray>>(points: P, cells: Vec<CellBlock>) -> Result<Self, MeshError> {
        Self::from_parts(points, cells, MeshData::default())
    }

    /// create a mesh, checking that `data` lines up with the points and cells
    pub fn from_parts<P: Into<DynArray>>(
        points: P,
        cells: Vec<CellBlock>,
        data: MeshData,
    ) -> Result<Self, MeshError> {
        let MeshData {
            point_data,
            cell_data,
            field_data,
            point_sets,
            cell_sets,
        } = data;

        let mesh = Self {
            points: points.into(),
            cells,
            point_data,
            cell_data,
            field_data,
            point_sets,
            cell_sets,
        };

        mesh.validate()?;
        Ok(mesh)
    }

    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }

    /// number of coordinates per point
    pub fn dim(&self) -> usize {
        self.points.ncols()
    }

    /// total number of cells over all blocks
    pub fn num_cells(&self) -> usize {
        self.cells.iter().map(CellBlock::len).sum()
    }

    /// check the invariants between points, cells and the attached data
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.points.ndim() != 2 {
            return Err(MeshError::PointsDimension(self.points.ndim()));
        }
        if !self.points.dtype().is_float() {
            return Err(MeshError::PointsDtype(self.points.dtype()));
        }

        let num_points = self.num_points();
        for (name, values) in &self.point_data {
            if values.ndim() == 0 || values.nrows() != num_points {
                return Err(MeshError::PointDataRows {
                    name: name.clone(),
                    expected: num_points,
                    found: if values.ndim() == 0 { 0 } else { values.nrows() },
                });
            }
        }

        for (name, blocks) in &self.cell_data {
            check_block_count("cell data", name, blocks.len(), self.cells.len())?;

            for (block, (values, cells)) in blocks.iter().zip(&self.cells).enumerate() {
                if values.ndim() == 0 || values.nrows() != cells.len() {
                    return Err(MeshError::CellDataRows {
                        name: name.clone(),
                        block,
                        expected: cells.len(),
                        found: if values.ndim() == 0 { 0 } else { values.nrows() },
                    });
                }
            }
        }

        for (name, blocks) in &self.cell_sets {
            check_block_count("cell set", name, blocks.len(), self.cells.len())?;
        }

        Ok(())
    }
}

fn check_block_count(
    kind: &'static str,
    name: &str,
    found: usize,
    expected: usize,
) -> Result<(), MeshError> {
    if found != expected {
        return Err(MeshError::CellBlocks {
            kind,
            name: name.into(),
            expected,
            found,
        });
    }
    Ok(())
}
