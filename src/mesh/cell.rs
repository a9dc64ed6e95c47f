use crate::error::CastError;
use crate::prelude::*;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// vertex counts for the standard cell types that are not in the
/// ply-decodable vocabulary
const NODES_PER_CELL: &[(&str, usize)] = &[
    ("line3", 3),
    ("triangle6", 6),
    ("quad8", 8),
    ("quad9", 9),
    ("tetra", 4),
    ("tetra10", 10),
    ("pyramid", 5),
    ("pyramid13", 13),
    ("pyramid14", 14),
    ("wedge", 6),
    ("wedge15", 15),
    ("wedge18", 18),
    ("hexahedron", 8),
    ("hexahedron20", 20),
    ("hexahedron24", 24),
    ("hexahedron27", 27),
];

/// The kind of cell stored in a [`CellBlock`]
///
/// The string tags are `vertex`, `line`, `triangle`, `quad` and `polygonN`.
/// Anything else parses to [`CellType::Other`], which covers both the standard
/// volumetric / higher order names (`tetra`, `hexahedron20`, ...) and user
/// defined tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellType {
    Vertex,
    Line,
    Triangle,
    Quad,
    /// an `N` vertex polygon
    Polygon(usize),
    Other(String),
}

impl CellType {
    /// the cell type for a connectivity row of `count` vertices. Counts
    /// outside of the fixed vocabulary become `polygon<count>`
    pub fn from_count(count: usize) -> Self {
        match count {
            1 => Self::Vertex,
            2 => Self::Line,
            3 => Self::Triangle,
            4 => Self::Quad,
            n => Self::Polygon(n),
        }
    }

    /// vertex count for the types a polygonal (ragged list) format can store
    pub fn polygon_count(&self) -> Option<usize> {
        match self {
            Self::Vertex => Some(1),
            Self::Line => Some(2),
            Self::Triangle => Some(3),
            Self::Quad => Some(4),
            Self::Polygon(n) => Some(*n),
            Self::Other(_) => None,
        }
    }

    /// vertex count of any known cell type, `None` for custom tags
    pub fn num_nodes(&self) -> Option<usize> {
        match self {
            Self::Other(name) => NODES_PER_CELL
                .iter()
                .find(|(known, _)| known == name)
                .map(|(_, count)| *count),
            known => known.polygon_count(),
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Line => write!(f, "line"),
            Self::Triangle => write!(f, "triangle"),
            Self::Quad => write!(f, "quad"),
            Self::Polygon(n) => write!(f, "polygon{n}"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for CellType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cell_type = match s {
            "vertex" => Self::Vertex,
            "line" => Self::Line,
            "triangle" => Self::Triangle,
            "quad" => Self::Quad,
            other => match other.strip_prefix("polygon").map(str::parse::<usize>) {
                Some(Ok(n)) => Self::Polygon(n),
                _ => Self::Other(other.into()),
            },
        };
        Ok(cell_type)
    }
}

impl From<&str> for CellType {
    fn from(x: &str) -> Self {
        match x.parse() {
            Ok(cell_type) => cell_type,
            Err(never) => match never {},
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A group of cells sharing one cell type and connectivity width.
///
/// `data` is a 2 dimensional integer array with one row of vertex indices per
/// cell.
pub struct CellBlock {
    cell_type: CellType,
    data: DynArray,
}

impl CellBlock {
    pub fn new<C, A>(cell_type: C, data: A) -> Result<Self, MeshError>
    where
        C: Into<CellType>,
        A: Into<DynArray>,
    {
        let cell_type = cell_type.into();
        let data = data.into();

        if data.ndim() != 2 {
            return Err(MeshError::CellsDimension {
                cell_type: cell_type.to_string(),
                ndim: data.ndim(),
            });
        }

        if !data.dtype().is_integer() {
            return Err(MeshError::CellsDtype {
                cell_type: cell_type.to_string(),
                dtype: data.dtype(),
            });
        }

        Ok(Self { cell_type, data })
    }

    pub fn cell_type(&self) -> &CellType {
        &self.cell_type
    }

    pub fn data(&self) -> &DynArray {
        &self.data
    }

    /// number of cells in the block
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// number of vertex indices per cell
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }

    pub fn into_parts(self) -> (CellType, DynArray) {
        (self.cell_type, self.data)
    }

    /// replace the connectivity with a copy in `dtype`
    pub(crate) fn cast_indices(&mut self, dtype: Dtype) -> Result<(), CastError> {
        self.data = self.data.cast_to(dtype)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn tags_round_trip() {
        for tag in ["vertex", "line", "triangle", "quad", "polygon7", "tetra", "customXYZ"] {
            assert_eq!(CellType::from(tag).to_string(), tag);
        }
        assert_eq!(CellType::from("polygon5"), CellType::Polygon(5));
        assert_eq!(CellType::from("polygonX"), CellType::Other("polygonX".into()));
    }

    #[test]
    fn counts() {
        assert_eq!(CellType::from_count(3), CellType::Triangle);
        assert_eq!(CellType::from_count(6), CellType::Polygon(6));
        assert_eq!(CellType::Quad.polygon_count(), Some(4));
        assert_eq!(CellType::from("hexahedron").polygon_count(), None);
        assert_eq!(CellType::from("hexahedron").num_nodes(), Some(8));
        assert_eq!(CellType::from("customXYZ").num_nodes(), None);
    }

    #[test]
    fn block_requires_integer_matrix() {
        assert!(CellBlock::new("triangle", array![[0i32, 1, 2]]).is_ok());
        assert!(CellBlock::new("triangle", array![[0.0f64, 1.0, 2.0]]).is_err());
        assert!(CellBlock::new("triangle", array![0i32, 1, 2]).is_err());
    }

    #[test]
    fn cast_indices_narrows() {
        let mut block = CellBlock::new("line", array![[0i64, 1], [1, 2]]).unwrap();
        block.cast_indices(Dtype::Int32).unwrap();
        assert_eq!(block.dtype(), Dtype::Int32);
        assert_eq!(block.len(), 2);
        assert_eq!(block.width(), 2);
    }
}
