//! Extension-keyed registry of point set readers and writers
//!
//! The registry lets callers open any supported file without naming a codec.
//! PLY is always registered; LAS and LAZ join when the `pasture` feature is
//! enabled.

use pointclass_core::{Error, PointSet, Result};
use std::collections::HashMap;
use std::path::Path;

/// Trait for reading point sets from files
pub trait PointSetReader: Send + Sync {
    /// Read a point set from the given path
    fn read_point_set(&self, path: &Path) -> Result<PointSet>;

    /// Check if this reader can handle the given file
    fn can_read(&self, path: &Path) -> bool;

    /// Get the format name this reader handles
    fn format_name(&self) -> &'static str;
}

/// Trait for writing point sets to files
pub trait PointSetWriter: Send + Sync {
    /// Write a point set to the given path
    fn write_point_set(&self, set: &PointSet, path: &Path) -> Result<()>;

    /// Get the format name this writer handles
    fn format_name(&self) -> &'static str;
}

/// IO registry that maps lowercase file extensions to handlers
pub struct IoRegistry {
    readers: HashMap<String, Box<dyn PointSetReader>>,
    writers: HashMap<String, Box<dyn PointSetWriter>>,
}

impl IoRegistry {
    /// Create a new empty IO registry
    pub fn new() -> Self {
        Self {
            readers: HashMap::new(),
            writers: HashMap::new(),
        }
    }

    /// Create a registry with every built-in format
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_reader("ply", Box::new(crate::ply::PlyReader));
        registry.register_writer("ply", Box::new(crate::ply::PlyWriter));

        #[cfg(feature = "pasture")]
        {
            for ext in ["las", "laz"] {
                registry.register_reader(ext, Box::new(crate::pasture::PastureReader));
                registry.register_writer(ext, Box::new(crate::pasture::PastureWriter));
            }
        }

        registry
    }

    /// Register a reader for a file extension
    pub fn register_reader(&mut self, extension: &str, reader: Box<dyn PointSetReader>) {
        self.readers.insert(extension.to_lowercase(), reader);
    }

    /// Register a writer for a file extension
    pub fn register_writer(&mut self, extension: &str, writer: Box<dyn PointSetWriter>) {
        self.writers.insert(extension.to_lowercase(), writer);
    }

    /// Read a point set using the reader registered for its extension
    pub fn read_point_set(&self, path: &Path) -> Result<PointSet> {
        let ext = extension_of(path)?;
        match self.readers.get(&ext) {
            Some(reader) if reader.can_read(path) => reader.read_point_set(path),
            _ => Err(Error::UnsupportedExtension(ext)),
        }
    }

    /// Write a point set using the writer registered for its extension
    pub fn write_point_set(&self, set: &PointSet, path: &Path) -> Result<()> {
        let ext = extension_of(path)?;
        match self.writers.get(&ext) {
            Some(writer) => writer.write_point_set(set, path),
            None => Err(Error::UnsupportedExtension(ext)),
        }
    }

    /// Extensions with a registered reader, sorted
    pub fn supported_read_extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self.readers.keys().cloned().collect();
        exts.sort();
        exts
    }

    /// Extensions with a registered writer, sorted
    pub fn supported_write_extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self.writers.keys().cloned().collect();
        exts.sort();
        exts
    }

    pub fn supports_reading(&self, extension: &str) -> bool {
        self.readers.contains_key(&extension.to_lowercase())
    }

    pub fn supports_writing(&self, extension: &str) -> bool {
        self.writers.contains_key(&extension.to_lowercase())
    }
}

impl Default for IoRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn extension_of(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .ok_or_else(|| Error::UnsupportedExtension(path.display().to_string()))
}
