//! I/O operations for point sets
//!
//! This crate reads and writes point sets, dispatching on the file extension.
//! PLY is handled natively; LAS and LAZ are available through pasture with the
//! `pasture` feature. Labels read from any format are translated into training
//! codes using the dataset's sidecar class mapping, or the ASPRS table when
//! there is none.

pub mod error;
pub mod mapping;
pub mod ply;
pub mod registry;
pub mod remap;

#[cfg(feature = "pasture")]
pub mod pasture;

pub use error::*;
pub use mapping::{class_mapping_for, load_class_mapping, resolve_sidecar, ClassMapping};
pub use ply::{ColorOrder, PlyFormat, PlyHeader, PlyLayout, PlyReader, PlyWriteOptions, PlyWriter};
pub use registry::{IoRegistry, PointSetReader, PointSetWriter};
pub use remap::LabelRemapper;

use pointclass_core::{AsprsTable, PointSet, Result, TrainingCodes};
use std::path::Path;

/// Options for [`read_point_set_with`]
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions<'a> {
    /// Translate labels into training codes after reading
    pub remap_labels: bool,
    pub training_codes: &'a TrainingCodes,
    pub asprs: &'a AsprsTable,
}

impl Default for ReadOptions<'static> {
    fn default() -> Self {
        Self {
            remap_labels: true,
            training_codes: TrainingCodes::canonical(),
            asprs: AsprsTable::canonical(),
        }
    }
}

impl<'a> ReadOptions<'a> {
    /// Use custom label tables
    pub fn with_tables<'b>(self, training_codes: &'b TrainingCodes, asprs: &'b AsprsTable) -> ReadOptions<'b> {
        ReadOptions {
            remap_labels: self.remap_labels,
            training_codes,
            asprs,
        }
    }

    /// Keep raw labels as stored in the file
    pub fn raw_labels(mut self) -> Self {
        self.remap_labels = false;
        self
    }
}

/// Read a point set and translate its labels into training codes
pub fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    read_point_set_with(path, &ReadOptions::default())
}

/// Read a point set with explicit options
pub fn read_point_set_with<P: AsRef<Path>>(path: P, options: &ReadOptions<'_>) -> Result<PointSet> {
    let path = path.as_ref();
    let mut set = IoRegistry::with_defaults().read_point_set(path)?;

    if options.remap_labels && set.has_labels() {
        let mapping = class_mapping_for(path);
        LabelRemapper::new(options.training_codes, options.asprs).remap(&mut set, &mapping)?;
    }

    Ok(set)
}

/// Write a point set, choosing the format from the extension
pub fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()> {
    IoRegistry::with_defaults().write_point_set(set, path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointclass_core::{Error, Point3f};
    use tempfile::TempDir;

    fn labelled_set(labels: Vec<u8>) -> PointSet {
        let points = (0..labels.len())
            .map(|i| Point3f::new(i as f32, 0.0, 0.0))
            .collect();
        let mut set = PointSet::from_points(points);
        set.labels = labels;
        set
    }

    #[test]
    fn test_read_remaps_with_asprs_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tile.ply");
        write_point_set(&labelled_set(vec![1, 2, 8]), &path).unwrap();

        let set = read_point_set(&path).unwrap();
        assert_eq!(set.labels, vec![0, 2, 0]);

        let raw = read_point_set_with(&path, &ReadOptions::default().raw_labels()).unwrap();
        assert_eq!(raw.labels, vec![1, 2, 8]);
    }

    #[test]
    fn test_custom_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tile.ply");
        write_point_set(&labelled_set(vec![3, 4]), &path).unwrap();

        let codes = TrainingCodes::from_pairs([("unassigned", 0), ("tree", 1)]).unwrap();
        let asprs = AsprsTable::from_pairs([(3, 1), (4, 1)]);
        let options = ReadOptions::default().with_tables(&codes, &asprs);

        let set = read_point_set_with(&path, &options).unwrap();
        assert_eq!(set.labels, vec![1, 1]);
    }

    #[test]
    fn test_uppercase_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("TILE.PLY");
        let set = PointSet::from_points(vec![Point3f::new(1.0, 2.0, 3.0)]);
        write_point_set(&set, &path).unwrap();
        assert_eq!(read_point_set(&path).unwrap(), set);
    }

    #[test]
    fn test_unknown_extension() {
        let err = read_point_set("cloud.xyz").unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension(_)));

        let err = write_point_set(&PointSet::new(), "cloud.e57").unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension(_)));
    }
}
