use super::{type_name, NAME};
use crate::prelude::*;
use crate::registry::WriteOptions;

const COORDINATES: [&str; 3] = ["x", "y", "z"];

/// index dtypes wider than the format stores, and what they are cast down to
fn narrowed(dtype: Dtype) -> Option<Dtype> {
    match dtype {
        Dtype::Int64 => Some(Dtype::Int32),
        Dtype::UInt64 => Some(Dtype::UInt32),
        _ => None,
    }
}

/// cast 64 bit connectivity down to 32 bits, warning once per source dtype
fn narrow_cells(cells: &mut [CellBlock], warnings: &mut Vec<Warning>) -> Result<(), Error> {
    let mut reported = Vec::new();

    for block in cells.iter_mut() {
        let from = block.dtype();
        let Some(to) = narrowed(from) else {
            continue;
        };

        if !reported.contains(&from) {
            reported.push(from);
            warn(
                warnings,
                Warning::NarrowedIndices {
                    format: NAME,
                    from,
                    to,
                },
            );
        }

        block.cast_indices(to)?;
    }

    Ok(())
}

/// the single index dtype shared by every written cell block
fn common_dtype<'a, I: Iterator<Item = &'a CellBlock>>(cells: I) -> Result<Option<Dtype>, Error> {
    let mut dtypes = cells.map(CellBlock::dtype);

    let Some(first) = dtypes.next() else {
        return Ok(None);
    };

    if let Some(other) = dtypes.find(|dtype| *dtype != first) {
        return Err(Error::UnsupportedOperation(format!(
            "{NAME} stores a single index type for all cells, got both {first} and {other}"
        )));
    }

    Ok(Some(first))
}

fn write_count(count: usize, dtype: Dtype, endian: Endianness, out: &mut Vec<u8>) {
    // the count dtype is chosen to be wide enough for the widest row
    match dtype {
        Dtype::UInt8 => out.push(count as u8),
        _ => with_byte_order!(endian, B => (count as u32).write::<B>(out)),
    }
}

pub(crate) fn write_mesh<W: Write + ?Sized>(
    writer: &mut W,
    mesh: &mut Mesh,
    options: &WriteOptions,
) -> Result<Vec<Warning>, Error> {
    mesh.validate()?;

    let mut warnings = Vec::new();

    let dim = mesh.dim();
    if dim == 0 || dim > COORDINATES.len() {
        return Err(Error::UnsupportedOperation(format!(
            "{NAME} stores 1 to 3 coordinates per point, got {dim}"
        )));
    }

    let endian = options.byte_order.unwrap_or_else(Endianness::native);
    let num_points = mesh.num_points();

    // the header is held back until every check on the cells has passed
    let mut header = Vec::new();
    header.extend_from_slice(b"ply\n");

    let encoding = match (options.binary, endian) {
        (false, _) => "ascii",
        (true, Endianness::Little) => "binary_little_endian",
        (true, Endianness::Big) => "binary_big_endian",
    };
    writeln!(header, "format {encoding} 1.0")?;
    writeln!(header, "comment Created by meshio v{}", env!("CARGO_PKG_VERSION"))?;

    writeln!(header, "element vertex {num_points}")?;
    let point_type = type_name(mesh.points.dtype());
    for name in &COORDINATES[..dim] {
        writeln!(header, "property {point_type} {name}")?;
    }

    let mut point_data = Vec::new();
    for (name, values) in &mesh.point_data {
        if values.ndim() != 1 {
            warn(
                &mut warnings,
                Warning::SkippedPointData {
                    format: NAME,
                    name: name.clone(),
                },
            );
            continue;
        }

        writeln!(header, "property {} {name}", type_name(values.dtype()))?;
        point_data.push(values);
    }

    for name in mesh.cell_data.keys() {
        warn(
            &mut warnings,
            Warning::SkippedCellData {
                format: NAME,
                name: name.clone(),
            },
        );
    }

    narrow_cells(&mut mesh.cells, &mut warnings)?;

    let mut num_faces = 0;
    let mut max_width = 0;
    for block in &mesh.cells {
        if block.cell_type().polygon_count().is_some() {
            num_faces += block.len();
            max_width = max_width.max(block.width());
        } else {
            warn(
                &mut warnings,
                Warning::SkippedCellType {
                    format: NAME,
                    cell_type: block.cell_type().clone(),
                },
            );
        }
    }

    let count_type = if max_width <= u8::MAX as usize {
        Dtype::UInt8
    } else {
        Dtype::UInt32
    };

    let is_face = |block: &&CellBlock| block.cell_type().polygon_count().is_some();

    if num_faces > 0 {
        let index_type = common_dtype(mesh.cells.iter().filter(is_face))?.unwrap_or(Dtype::Int32);
        writeln!(header, "element face {num_faces}")?;
        writeln!(
            header,
            "property list {} {} vertex_indices",
            type_name(count_type),
            type_name(index_type)
        )?;
    }

    header.extend_from_slice(b"end_header\n");
    writer.write_all(&header)?;

    let faces = mesh.cells.iter().filter(is_face);

    if options.binary {
        let mut body = Vec::new();

        for i in 0..num_points {
            for j in 0..dim {
                mesh.points.push_bytes(&[i, j], endian, &mut body);
            }
            for values in &point_data {
                values.push_bytes(&[i], endian, &mut body);
            }
        }

        for block in faces {
            let width = block.width();
            for row in 0..block.len() {
                write_count(width, count_type, endian, &mut body);
                for j in 0..width {
                    block.data().push_bytes(&[row, j], endian, &mut body);
                }
            }
        }

        writer.write_all(&body)?;
    } else {
        let mut body = String::new();

        for i in 0..num_points {
            for j in 0..dim {
                if j > 0 {
                    body.push(' ');
                }
                mesh.points.push_ascii(&[i, j], &mut body);
            }
            for values in &point_data {
                body.push(' ');
                values.push_ascii(&[i], &mut body);
            }
            body.push('\n');
        }

        for block in faces {
            let width = block.width();
            for row in 0..block.len() {
                body.push_str(&width.to_string());
                for j in 0..width {
                    body.push(' ');
                    block.data().push_ascii(&[row, j], &mut body);
                }
                body.push('\n');
            }
        }

        writer.write_all(body.as_bytes())?;
    }

    log::debug!(
        "wrote ply file with {num_points} points and {num_faces} faces ({} warnings)",
        warnings.len()
    );

    Ok(warnings)
}
