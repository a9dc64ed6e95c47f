//! packed binary bodies, rows laid out back to back without separators

use super::header::{Element, ElementKind, Header, Property};
use super::{FaceTable, VertexTable};
use crate::prelude::*;
use crate::ragged::{FieldPosition, RaggedLayout, RaggedList};

pub(crate) fn read_body<R: BufRead + ?Sized>(
    reader: &mut R,
    header: &Header,
    endian: Endianness,
) -> Result<(Option<VertexTable>, Option<FaceTable>), Error> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let mut position = 0;
    let mut vertices = None;
    let mut faces = None;

    for element in &header.elements {
        let remaining = &buffer[position..];

        let consumed = match element.kind {
            ElementKind::Vertex => {
                let (consumed, table) = read_vertices(remaining, element, endian)?;
                vertices = Some(table);
                consumed
            }
            ElementKind::Face => {
                let (consumed, table) = read_faces(remaining, element, endian)?;
                faces = Some(table);
                consumed
            }
        };

        position += consumed;
    }

    if position < buffer.len() {
        log::debug!(
            "ignoring {} trailing bytes after the last ply element",
            buffer.len() - position
        );
    }

    Ok((vertices, faces))
}

fn scalar_dtype(property: &Property) -> Dtype {
    match property {
        Property::Scalar { dtype, .. } => *dtype,
        // rejected while parsing the header
        Property::List { data, .. } => *data,
    }
}

fn read_vertices(
    buffer: &[u8],
    element: &Element,
    endian: Endianness,
) -> Result<(usize, VertexTable), Error> {
    let dtypes: Vec<Dtype> = element.properties.iter().map(scalar_dtype).collect();
    let stride: usize = dtypes.iter().map(Dtype::size).sum();

    let truncated = |expected| BodyError::Truncated {
        element: element.kind.name().into(),
        expected,
        found: buffer.len(),
    };

    let needed = stride
        .checked_mul(element.count)
        .ok_or_else(|| truncated(usize::MAX))?;

    if buffer.len() < needed {
        return Err(truncated(needed).into());
    }

    let mut columns: Vec<Box<dyn Column>> = dtypes
        .iter()
        .map(|dtype| new_column(*dtype, element.count))
        .collect();

    if stride > 0 {
        for record in buffer[..needed].chunks_exact(stride) {
            let mut offset = 0;
            for column in columns.iter_mut() {
                let size = column.dtype().size();
                column.push_bytes(&record[offset..offset + size], endian);
                offset += size;
            }
        }
    }

    let columns = element
        .properties
        .iter()
        .zip(columns)
        .map(|(property, column)| Ok((property.name().to_string(), column.finish(&[element.count])?)))
        .collect::<Result<Vec<_>, BodyError>>()?;

    Ok((needed, VertexTable { columns }))
}

fn read_faces(
    buffer: &[u8],
    element: &Element,
    endian: Endianness,
) -> Result<(usize, FaceTable), Error> {
    let list_index = element
        .properties
        .iter()
        .position(|property| matches!(property, Property::List { .. }));

    let (list_index, count, data) = match list_index.map(|i| (i, &element.properties[i])) {
        Some((i, Property::List { count, data, .. })) => (i, *count, *data),
        _ => {
            return Err(HeaderError::from(crate::error::UnsupportedProperty::new(
                "face".into(),
                "vertex_indices".into(),
                "the face element does not declare a list property",
            ))
            .into())
        }
    };

    // scalar fields on either side of the list
    let mut fields = Vec::new();
    let mut prefix = 0;
    let mut suffix = 0;

    for (i, property) in element.properties.iter().enumerate() {
        let dtype = scalar_dtype(property);
        if i < list_index {
            fields.push((property.name(), dtype, FieldPosition::Prefix(prefix)));
            prefix += dtype.size();
        } else if i > list_index {
            fields.push((property.name(), dtype, FieldPosition::Suffix(suffix)));
            suffix += dtype.size();
        }
    }

    let layout = RaggedLayout::new(count, data, endian).with_padding(prefix, suffix);
    let list = RaggedList::scan(buffer, layout, element.count)?;

    let mut table = FaceTable::default();
    for (name, _, _) in &fields {
        table.cell_data.insert(name.to_string(), Vec::new());
    }

    for block in list.blocks() {
        table.blocks.push(block.to_cell_block()?);

        for (name, dtype, position) in &fields {
            let column = block.scalar_column(*position, *dtype)?;
            if let Some(data) = table.cell_data.get_mut(*name) {
                data.push(column);
            }
        }
    }

    log::debug!(
        "binary face element split into {} blocks of equal row length",
        table.blocks.len()
    );

    Ok((list.consumed(), table))
}

#[cfg(test)]
mod tests {
    use super::super::header::read_header;
    use super::*;
    use ndarray::array;

    fn read(header: &str, body: &[u8]) -> Result<(Option<VertexTable>, Option<FaceTable>), Error> {
        let mut input = header.as_bytes().to_vec();
        input.extend_from_slice(body);

        let mut reader = input.as_slice();
        let header = read_header(&mut reader)?;
        let endian = match header.encoding {
            super::super::header::Encoding::Binary(endian) => endian,
            super::super::header::Encoding::Ascii => panic!("expected a binary header"),
        };
        read_body(&mut reader, &header, endian)
    }

    #[test]
    fn vertices_big_endian() {
        let header = "ply\nformat binary_big_endian 1.0\n\
            element vertex 2\n\
            property float x\n\
            property short temperature\n\
            end_header\n";

        let mut body = Vec::new();
        body.extend_from_slice(&1.5f32.to_be_bytes());
        body.extend_from_slice(&(-3i16).to_be_bytes());
        body.extend_from_slice(&2.5f32.to_be_bytes());
        body.extend_from_slice(&300i16.to_be_bytes());

        let (vertices, faces) = read(header, &body).unwrap();
        assert!(faces.is_none());

        let vertices = vertices.unwrap();
        assert_eq!(
            vertices.columns[0].1.view::<f32>().unwrap(),
            &array![1.5f32, 2.5].into_dyn()
        );
        assert_eq!(
            vertices.columns[1].1.view::<i16>().unwrap(),
            &array![-3i16, 300].into_dyn()
        );
    }

    #[test]
    fn faces_with_surrounding_scalars() {
        let header = "ply\nformat binary_little_endian 1.0\n\
            element face 3\n\
            property uchar material\n\
            property list uchar uint vertex_indices\n\
            property float weight\n\
            end_header\n";

        let mut body = Vec::new();
        for (material, row, weight) in [
            (1u8, vec![0u32, 1, 2], 0.5f32),
            (2, vec![2, 3, 4], 1.5),
            (3, vec![0, 1, 2, 3], 2.5),
        ] {
            body.push(material);
            body.push(row.len() as u8);
            for value in row {
                body.extend_from_slice(&value.to_le_bytes());
            }
            body.extend_from_slice(&weight.to_le_bytes());
        }

        let (_, faces) = read(header, &body).unwrap();
        let faces = faces.unwrap();

        assert_eq!(faces.blocks.len(), 2);
        assert_eq!(faces.blocks[0].cell_type(), &CellType::Triangle);
        assert_eq!(
            faces.blocks[0].data().view::<u32>().unwrap(),
            &array![[0u32, 1, 2], [2, 3, 4]].into_dyn()
        );
        assert_eq!(faces.blocks[1].cell_type(), &CellType::Quad);

        let material = &faces.cell_data["material"];
        assert_eq!(material[0].view::<u8>().unwrap(), &array![1u8, 2].into_dyn());
        assert_eq!(material[1].view::<u8>().unwrap(), &array![3u8].into_dyn());

        let weight = &faces.cell_data["weight"];
        assert_eq!(
            weight[0].view::<f32>().unwrap(),
            &array![0.5f32, 1.5].into_dyn()
        );
        assert_eq!(weight[1].view::<f32>().unwrap(), &array![2.5f32].into_dyn());
    }

    #[test]
    fn truncated_vertices() {
        let header = "ply\nformat binary_little_endian 1.0\n\
            element vertex 2\n\
            property double x\n\
            end_header\n";

        let out = read(header, &1.0f64.to_le_bytes());
        assert!(matches!(
            out,
            Err(Error::MalformedBody(BodyError::Truncated {
                expected: 16,
                found: 8,
                ..
            }))
        ));
    }

    #[test]
    fn elements_follow_each_other() {
        let header = "ply\nformat binary_little_endian 1.0\n\
            element vertex 1\n\
            property double x\n\
            element face 1\n\
            property list uchar int vertex_indices\n\
            end_header\n";

        let mut body = 4.0f64.to_le_bytes().to_vec();
        body.push(2);
        body.extend_from_slice(&0i32.to_le_bytes());
        body.extend_from_slice(&0i32.to_le_bytes());

        let (vertices, faces) = read(header, &body).unwrap();
        assert_eq!(
            vertices.unwrap().columns[0].1.view::<f64>().unwrap(),
            &array![4.0f64].into_dyn()
        );

        let faces = faces.unwrap();
        assert_eq!(faces.blocks.len(), 1);
        assert_eq!(faces.blocks[0].cell_type(), &CellType::Line);
    }
}
