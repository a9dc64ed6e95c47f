//! the ascii header that precedes every ply body
//!
//! ```text
//! ply
//! format binary_little_endian 1.0
//! comment anything
//! element vertex 8
//! property float x
//! property float y
//! property float z
//! element face 6
//! property list uchar int vertex_indices
//! end_header
//! ```

use super::dtype_from_name;
use crate::error::{UnexpectedLine, UnsupportedProperty};
use crate::prelude::*;

const MAGIC: &str = "ply";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Ascii,
    Binary(Endianness),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementKind {
    Vertex,
    Face,
}

impl ElementKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Face => "face",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Property {
    Scalar { name: String, dtype: Dtype },
    List { name: String, count: Dtype, data: Dtype },
}

impl Property {
    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Scalar { name, .. } | Self::List { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub(crate) kind: ElementKind,
    pub(crate) count: usize,
    pub(crate) properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Header {
    pub(crate) encoding: Encoding,
    /// elements in the order their rows appear in the body
    pub(crate) elements: Vec<Element>,
}

/// read a single line, without the trailing newline or surrounding whitespace
fn read_line<R: BufRead + ?Sized>(reader: &mut R, buffer: &mut Vec<u8>) -> Result<String, Error> {
    buffer.clear();
    if reader.read_until(b'\n', buffer)? == 0 {
        return Err(HeaderError::UnexpectedEof.into());
    }

    let line = std::str::from_utf8(buffer).map_err(|_| HeaderError::Utf8)?;
    Ok(line.trim().to_string())
}

/// fast forward to the next line that is not blank or a comment
fn next_line<R: BufRead + ?Sized>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
) -> Result<String, Error> {
    loop {
        let line = read_line(reader, buffer)?;

        if let Some(comment) = line.strip_prefix("comment") {
            log::debug!("ply header comment: {}", comment.trim());
            continue;
        }

        if !line.is_empty() {
            return Ok(line);
        }
    }
}

fn parse_encoding(line: &str) -> Result<Encoding, HeaderError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let encoding = match tokens.as_slice() {
        ["format", "ascii", "1.0"] => Encoding::Ascii,
        ["format", "binary_little_endian", "1.0"] => Encoding::Binary(Endianness::Little),
        ["format", "binary_big_endian", "1.0"] => Encoding::Binary(Endianness::Big),
        _ => return Err(HeaderError::Format(line.into())),
    };

    Ok(encoding)
}

fn parse_element(line: &str) -> Result<Element, HeaderError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let (kind, count) = match tokens.as_slice() {
        ["element", "vertex", count] => (ElementKind::Vertex, *count),
        ["element", "face", count] => (ElementKind::Face, *count),
        _ => {
            return Err(UnexpectedLine::new(
                "`element vertex`, `element face` or `obj_info`",
                line,
            )
            .into())
        }
    };

    let count = count
        .parse()
        .map_err(|_| HeaderError::InvalidCount(line.into()))?;

    Ok(Element {
        kind,
        count,
        properties: Vec::new(),
    })
}

fn parse_property(line: &str) -> Result<Property, HeaderError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let property = match tokens.as_slice() {
        ["property", "list", count, data, name] => Property::List {
            name: (*name).into(),
            count: dtype_from_name(count)?,
            data: dtype_from_name(data)?,
        },
        ["property", dtype, name] => Property::Scalar {
            name: (*name).into(),
            dtype: dtype_from_name(dtype)?,
        },
        _ => {
            return Err(UnexpectedLine::new(
                "`property <type> <name>` or `property list <count type> <data type> <name>`",
                line,
            )
            .into())
        }
    };

    Ok(property)
}

/// check that a property may be added to `element`
fn check_property(element: &Element, property: &Property) -> Result<(), HeaderError> {
    let Property::List { name, count, data } = property else {
        return Ok(());
    };

    let unsupported = |reason| UnsupportedProperty::new(element.kind.name().into(), name.clone(), reason);

    if element.kind == ElementKind::Vertex {
        return Err(unsupported("list properties are only read on faces").into());
    }

    let has_list = element
        .properties
        .iter()
        .any(|p| matches!(p, Property::List { .. }));

    if has_list {
        return Err(unsupported("a face may only have a single list property").into());
    }

    if !count.is_integer() || !data.is_integer() {
        return Err(unsupported("vertex index lists must use integer types").into());
    }

    Ok(())
}

/// check the properties of an element once all of them have been declared
fn check_element(element: &Element) -> Result<(), HeaderError> {
    match element.kind {
        ElementKind::Vertex => match element.properties.first() {
            Some(Property::Scalar { name, .. }) if name == "x" => Ok(()),
            Some(other) => Err(HeaderError::MissingCoordinates(other.name().into())),
            None => Err(HeaderError::MissingCoordinates(String::new())),
        },
        ElementKind::Face => {
            let has_list = element
                .properties
                .iter()
                .any(|p| matches!(p, Property::List { .. }));

            if has_list {
                Ok(())
            } else {
                Err(UnsupportedProperty::new(
                    "face".into(),
                    "vertex_indices".into(),
                    "the face element does not declare a list property",
                )
                .into())
            }
        }
    }
}

/// parse everything up to and including the `end_header` line
pub(crate) fn read_header<R: BufRead + ?Sized>(reader: &mut R) -> Result<Header, Error> {
    let mut buffer = Vec::new();

    let magic = read_line(reader, &mut buffer)?;
    if magic != MAGIC {
        return Err(HeaderError::MissingMagic {
            expected: MAGIC,
            actual: magic,
        }
        .into());
    }

    let line = next_line(reader, &mut buffer)?;
    let encoding = parse_encoding(&line)?;

    let mut elements: Vec<Element> = Vec::new();

    loop {
        let line = next_line(reader, &mut buffer)?;

        if line == "end_header" {
            break;
        }

        let first = line.split_whitespace().next().unwrap_or_default();

        match first {
            "obj_info" => {
                log::debug!("skipping ply header line `{line}`");
            }
            "element" => {
                let element = parse_element(&line)?;

                if elements.iter().any(|e| e.kind == element.kind) {
                    return Err(HeaderError::DuplicateElement(element.kind.name().into()).into());
                }

                if let Some(previous) = elements.last() {
                    check_element(previous)?;
                }

                elements.push(element);
            }
            "property" => {
                let property = parse_property(&line)?;

                let element = elements.last_mut().ok_or_else(|| {
                    HeaderError::from(UnexpectedLine::new("`element` before `property`", line.as_str()))
                })?;

                check_property(element, &property)?;
                element.properties.push(property);
            }
            _ => {
                return Err(HeaderError::from(UnexpectedLine::new(
                    "`element vertex`, `element face` or `obj_info`",
                    line.as_str(),
                ))
                .into());
            }
        }
    }

    if let Some(last) = elements.last() {
        check_element(last)?;
    }

    Ok(Header {
        encoding,
        elements,
    })
}
