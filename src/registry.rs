//! # Format Registry
//!
//! Maps format names and file extensions to reader and writer callables.
//!
//! [`FormatRegistry::builtin`] is the process wide, read only registry used by
//! the free functions at the crate root ([`read`](crate::read),
//! [`write`](crate::write), ...). Build your own registry with
//! [`FormatRegistry::with_builtin_formats`] and [`FormatRegistry::register`]
//! to add codecs without touching global state.
//!
//! ```
//! use meshio::{FormatRegistry, Mesh, ReadMesh};
//! use std::io::BufRead;
//!
//! let reader: Box<dyn ReadMesh> = Box::new(|_: &mut dyn BufRead| -> Result<Mesh, meshio::Error> {
//!     Ok(Mesh::new(ndarray::Array2::<f64>::zeros((0, 3)), vec![])?)
//! });
//!
//! let mut registry = FormatRegistry::with_builtin_formats();
//! registry.register("null", &[".null", ".null.gz"], Some(reader), vec![]);
//!
//! assert_eq!(registry.resolve_format("MESH.NULL.GZ").unwrap(), "null");
//! assert_eq!(registry.resolve_format("cube.ply").unwrap(), "ply");
//! ```

use crate::error::{FormatUnknown, ShapeMismatch};
use crate::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::OnceLock;

/// A codec that decodes a [`Mesh`] from a byte stream
pub trait ReadMesh: Send + Sync {
    fn read_mesh(&self, reader: &mut dyn BufRead) -> Result<Mesh, Error>;
}

impl<F> ReadMesh for F
where
    F: Fn(&mut dyn BufRead) -> Result<Mesh, Error> + Send + Sync,
{
    fn read_mesh(&self, reader: &mut dyn BufRead) -> Result<Mesh, Error> {
        self(reader)
    }
}

/// A codec that encodes a [`Mesh`] to a byte stream
///
/// Writers may normalize `mesh` in place (for example narrowing the index
/// type of its cells) and report what they changed or dropped as warnings.
pub trait WriteMesh: Send + Sync {
    fn write_mesh(
        &self,
        writer: &mut dyn Write,
        mesh: &mut Mesh,
        options: &WriteOptions,
    ) -> Result<Vec<Warning>, Error>;
}

impl<F> WriteMesh for F
where
    F: Fn(&mut dyn Write, &mut Mesh, &WriteOptions) -> Result<Vec<Warning>, Error> + Send + Sync,
{
    fn write_mesh(
        &self,
        writer: &mut dyn Write,
        mesh: &mut Mesh,
        options: &WriteOptions,
    ) -> Result<Vec<Warning>, Error> {
        self(writer, mesh, options)
    }
}

/// Encoding options understood by the writers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// write a binary body instead of ascii text, where the format offers both
    pub binary: bool,
    /// byte order of binary bodies, defaults to the byte order of the host
    pub byte_order: Option<Endianness>,
}

impl WriteOptions {
    /// ascii text output
    pub fn ascii() -> Self {
        Self {
            binary: false,
            byte_order: None,
        }
    }

    /// binary output in the host's byte order
    pub fn binary() -> Self {
        Self {
            binary: true,
            byte_order: None,
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::binary()
    }
}

/// Lookup tables from format names and extensions to codecs
#[derive(Default)]
pub struct FormatRegistry {
    /// lowercase extension (including the leading dot) to format name
    extensions: HashMap<String, String>,
    readers: HashMap<String, Box<dyn ReadMesh>>,
    writers: HashMap<String, Box<dyn WriteMesh>>,
    /// formats whose data is spread over several files
    multi_file: HashSet<String>,
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("extensions", &self.extensions)
            .field("formats", &self.formats())
            .field("multi_file", &self.multi_file)
            .finish()
    }
}

/// the suffixes of a file name, `["." + part]` for every dot separated part
/// after the first. Leading dots do not start a suffix.
fn suffixes(file_name: &str) -> Vec<String> {
    if file_name.ends_with('.') {
        return Vec::new();
    }

    file_name
        .trim_start_matches('.')
        .split('.')
        .skip(1)
        .map(|part| format!(".{part}"))
        .collect()
}

impl FormatRegistry {
    /// an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// a registry holding every codec that ships with the crate
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        crate::ply::register(&mut registry);
        registry
    }

    /// the shared registry used by the crate level functions
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<FormatRegistry> = OnceLock::new();
        BUILTIN.get_or_init(Self::with_builtin_formats)
    }

    /// add a format, replacing any earlier registration of the same name,
    /// extensions or writer names
    pub fn register(
        &mut self,
        name: &str,
        extensions: &[&str],
        reader: Option<Box<dyn ReadMesh>>,
        writers: Vec<(&str, Box<dyn WriteMesh>)>,
    ) {
        for extension in extensions {
            self.extensions
                .insert(extension.to_lowercase(), name.to_string());
        }

        if let Some(reader) = reader {
            self.readers.insert(name.to_string(), reader);
        }

        for (writer_name, writer) in writers {
            self.writers.insert(writer_name.to_string(), writer);
        }
    }

    /// mark `name` as a format whose data spans multiple files, so it can only
    /// be read from and written to paths
    pub fn register_multi_file(&mut self, name: &str) {
        self.multi_file.insert(name.to_string());
    }

    /// sorted names of every format with a reader or writer
    pub fn formats(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .readers
            .keys()
            .chain(self.writers.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Infer the format of `path` from its extension.
    ///
    /// Suffixes are combined from right to left (`.vtu`, then `.gz.vtu` style
    /// compounds) and compared case insensitively; the longest registered
    /// combination wins.
    pub fn resolve_format<P: AsRef<Path>>(&self, path: P) -> Result<&str, Error> {
        let file_name = path
            .as_ref()
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        let mut extension = String::new();
        let mut format = None;

        for suffix in suffixes(file_name).iter().rev() {
            extension = format!("{suffix}{extension}").to_lowercase();
            if let Some(name) = self.extensions.get(&extension) {
                format = Some(name.as_str());
            }
        }

        format.ok_or_else(|| FormatUnknown::Extension(extension).into())
    }

    fn unknown(&self, name: &str) -> Error {
        FormatUnknown::Name {
            name: name.into(),
            known: self.formats().into_iter().map(String::from).collect(),
        }
        .into()
    }

    fn reader(&self, format: &str) -> Result<&dyn ReadMesh, Error> {
        self.readers
            .get(format)
            .map(|reader| reader.as_ref())
            .ok_or_else(|| self.unknown(format))
    }

    fn writer(&self, format: &str) -> Result<&dyn WriteMesh, Error> {
        self.writers
            .get(format)
            .map(|writer| writer.as_ref())
            .ok_or_else(|| self.unknown(format))
    }

    fn reject_stream(&self, format: &str) -> Result<(), Error> {
        if self.multi_file.contains(format) {
            return Err(Error::UnsupportedOperation(format!(
                "format `{format}` spans multiple files and needs a path rather than a stream"
            )));
        }
        Ok(())
    }

    /// Read the mesh stored at `path`, inferring the format from the file
    /// extension unless `format` is given
    pub fn read<P: AsRef<Path>>(&self, path: P, format: Option<&str>) -> Result<Mesh, Error> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let format = match format {
            Some(format) => format,
            None => self.resolve_format(path)?,
        };

        let reader = self.reader(format)?;

        log::debug!("reading `{}` as {format}", path.display());

        let mut stream = BufReader::new(File::open(path)?);
        reader.read_mesh(&mut stream)
    }

    /// Read a mesh of `format` from an already opened stream
    pub fn read_stream(&self, stream: &mut dyn BufRead, format: &str) -> Result<Mesh, Error> {
        self.reject_stream(format)?;
        self.reader(format)?.read_mesh(stream)
    }

    /// Write `mesh` to `path`, inferring the format from the file extension
    /// unless `format` is given. Nothing is created on disk if the mesh is
    /// rejected, whether by the shape checks or by the format's encoder.
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        mesh: &mut Mesh,
        format: Option<&str>,
        options: &WriteOptions,
    ) -> Result<Vec<Warning>, Error> {
        let path = path.as_ref();

        let format = match format {
            Some(format) => format,
            None => self.resolve_format(path)?,
        };

        let writer = self.writer(format)?;
        check_cells(&mesh.cells)?;

        log::debug!("writing `{}` as {format}", path.display());

        // encode fully before touching the filesystem
        let mut encoded = Vec::new();
        let warnings = writer.write_mesh(&mut encoded, mesh, options)?;

        let mut stream = BufWriter::new(File::create(path)?);
        stream.write_all(&encoded)?;
        stream.flush()?;

        Ok(warnings)
    }

    /// Write `mesh` as `format` to an already opened stream
    pub fn write_stream(
        &self,
        stream: &mut dyn Write,
        mesh: &mut Mesh,
        format: &str,
        options: &WriteOptions,
    ) -> Result<Vec<Warning>, Error> {
        self.reject_stream(format)?;
        let writer = self.writer(format)?;
        check_cells(&mesh.cells)?;

        writer.write_mesh(stream, mesh, options)
    }
}

/// Check every cell block against the vertex count of its type.
///
/// `polygonN` blocks need `N` columns and the fixed named types need their
/// tabulated count. Custom tags are passed through unchecked.
pub fn check_cells(cells: &[CellBlock]) -> Result<(), Error> {
    for block in cells {
        let cell_type = block.cell_type();

        if let CellType::Other(name) = cell_type {
            if name.starts_with("polygon") {
                return Err(Error::MalformedKey(name.clone()));
            }
        }

        if let Some(expected) = cell_type.num_nodes() {
            if block.width() != expected {
                return Err(Error::ShapeMismatch(ShapeMismatch::new(
                    cell_type.to_string(),
                    expected,
                    block.width(),
                )));
            }
        }
    }

    Ok(())
}
