//! whitespace separated ascii bodies, one element row per line

use super::header::{Element, ElementKind, Header, Property};
use super::{FaceTable, VertexTable};
use crate::prelude::*;
use std::collections::HashMap;

/// upper bound on rows reserved up front from a header's element count
const MAX_RESERVED_ROWS: usize = 1 << 20;

pub(crate) fn read_body<R: BufRead + ?Sized>(
    reader: &mut R,
    header: &Header,
) -> Result<(Option<VertexTable>, Option<FaceTable>), Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let mut vertices = None;
    let mut faces = None;

    for element in &header.elements {
        match element.kind {
            ElementKind::Vertex => vertices = Some(read_vertices(&mut lines, element)?),
            ElementKind::Face => faces = Some(read_faces(&mut lines, element)?),
        }
    }

    Ok((vertices, faces))
}

fn next_row<'a, I: Iterator<Item = &'a str>>(
    lines: &mut I,
    element: &Element,
    row: usize,
) -> Result<&'a str, BodyError> {
    lines.next().ok_or_else(|| BodyError::UnexpectedEof {
        element: element.kind.name().into(),
        row,
    })
}

fn read_vertices<'a, I: Iterator<Item = &'a str>>(
    lines: &mut I,
    element: &Element,
) -> Result<VertexTable, Error> {
    let reserved = element.count.min(MAX_RESERVED_ROWS);
    let mut columns: Vec<Box<dyn Column>> = element
        .properties
        .iter()
        .map(|property| match property {
            Property::Scalar { dtype, .. } => new_column(*dtype, reserved),
            // rejected while parsing the header
            Property::List { data, .. } => new_column(*data, reserved),
        })
        .collect();

    let mut tokens: Vec<&str> = Vec::with_capacity(columns.len());

    for row in 0..element.count {
        let line = next_row(lines, element, row)?;

        tokens.clear();
        tokens.extend(line.split_whitespace());

        if tokens.len() != columns.len() {
            return Err(BodyError::RowLength {
                element: element.kind.name().into(),
                row,
                expected: columns.len(),
                found: tokens.len(),
            }
            .into());
        }

        for (token, column) in tokens.iter().zip(columns.iter_mut()) {
            column.push_token(token)?;
        }
    }

    let columns = element
        .properties
        .iter()
        .zip(columns)
        .map(|(property, column)| Ok((property.name().to_string(), column.finish(&[element.count])?)))
        .collect::<Result<Vec<_>, BodyError>>()?;

    Ok(VertexTable { columns })
}

/// parse a list count token as its declared integer type
fn parse_list_count(token: &str, dtype: Dtype) -> Result<usize, BodyError> {
    let count = with_scalar_type!(dtype, T => {
        token
            .parse::<T>()
            .ok()
            .and_then(|count| num_traits::cast::<T, usize>(count))
    });

    count.ok_or_else(|| BodyError::InvalidListCount(token.into()))
}

/// rows of a face element that share a list length
struct Bucket {
    width: usize,
    rows: usize,
    indices: Box<dyn Column>,
    scalars: Vec<Box<dyn Column>>,
}

fn read_faces<'a, I: Iterator<Item = &'a str>>(
    lines: &mut I,
    element: &Element,
) -> Result<FaceTable, Error> {
    let mut list_dtype = None;
    let mut scalar_dtypes = Vec::new();
    let mut scalar_names = Vec::new();

    for property in &element.properties {
        match property {
            Property::Scalar { name, dtype } => {
                scalar_names.push(name.clone());
                scalar_dtypes.push(*dtype);
            }
            Property::List { data, .. } => list_dtype = Some(*data),
        }
    }

    let list_dtype = list_dtype.ok_or_else(|| {
        HeaderError::from(crate::error::UnsupportedProperty::new(
            "face".into(),
            "vertex_indices".into(),
            "the face element does not declare a list property",
        ))
    })?;

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut by_width: HashMap<usize, usize> = HashMap::new();
    let mut tokens: Vec<&str> = Vec::new();

    for row in 0..element.count {
        let line = next_row(lines, element, row)?;

        tokens.clear();
        tokens.extend(line.split_whitespace());

        let row_length = |expected| BodyError::RowLength {
            element: element.kind.name().into(),
            row,
            expected,
            found: tokens.len(),
        };

        // walk the properties once to find the list length of this row
        let mut width = 0;
        let mut position = 0;
        for property in &element.properties {
            match property {
                Property::Scalar { .. } => position += 1,
                Property::List { count, .. } => {
                    let token = tokens.get(position).ok_or_else(|| row_length(position + 1))?;
                    width = parse_list_count(token, *count)?;

                    let start = position + 1;
                    if width > tokens.len() - start {
                        return Err(row_length(start.saturating_add(width)).into());
                    }
                    position = start + width;
                }
            }
        }

        if position != tokens.len() {
            return Err(row_length(position).into());
        }

        let index = *by_width.entry(width).or_insert_with(|| {
            buckets.push(Bucket {
                width,
                rows: 0,
                indices: new_column(list_dtype, 0),
                scalars: scalar_dtypes.iter().map(|dtype| new_column(*dtype, 0)).collect(),
            });
            buckets.len() - 1
        });
        let bucket = &mut buckets[index];

        let mut position = 0;
        let mut scalar = 0;
        for property in &element.properties {
            match property {
                Property::Scalar { .. } => {
                    bucket.scalars[scalar].push_token(tokens[position])?;
                    scalar += 1;
                    position += 1;
                }
                Property::List { .. } => {
                    for token in &tokens[position + 1..position + 1 + width] {
                        bucket.indices.push_token(token)?;
                    }
                    position += 1 + width;
                }
            }
        }

        bucket.rows += 1;
    }

    log::debug!(
        "ascii face element split into {} blocks by row length",
        buckets.len()
    );

    let mut table = FaceTable::default();
    let mut cell_data: Vec<Vec<DynArray>> = vec![Vec::new(); scalar_names.len()];

    for bucket in buckets {
        let indices = bucket.indices.finish(&[bucket.rows, bucket.width])?;
        table
            .blocks
            .push(CellBlock::new(CellType::from_count(bucket.width), indices)?);

        for (column, data) in bucket.scalars.into_iter().zip(cell_data.iter_mut()) {
            data.push(column.finish(&[bucket.rows])?);
        }
    }

    table.cell_data = scalar_names.into_iter().zip(cell_data).collect();

    Ok(table)
}
