//! Sidecar class mapping files
//!
//! A dataset may ship a JSON file next to its point data describing what its
//! raw classification labels mean:
//!
//! ```json
//! { "classification": { "2": "ground", "5": "high_vegetation" } }
//! ```
//!
//! For `scan.ply` the sidecar is `scan.json`. Evaluation copies named
//! `scan_eval.ply` fall back to `scan.json`, and any file falls back to a
//! `mappings.json` in the same directory.

use crate::error::MappingError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Raw label → class name
pub type ClassMapping = HashMap<i32, String>;

/// Directory-wide fallback mapping file name
pub const MAPPINGS_FILE_NAME: &str = "mappings.json";

const EVAL_SUFFIX: &str = "_eval";

#[derive(Debug, Deserialize)]
struct MappingFile {
    classification: Option<HashMap<String, String>>,
}

/// Locate the sidecar mapping file for a data file
pub fn resolve_sidecar<P: AsRef<Path>>(data_path: P) -> Option<PathBuf> {
    let data_path = data_path.as_ref();
    let dir = data_path.parent().unwrap_or_else(|| Path::new(""));
    let stem = data_path.file_stem()?.to_string_lossy();

    let co_named = dir.join(format!("{}.json", stem));
    if co_named.is_file() {
        return Some(co_named);
    }

    if let Some(base) = stem.strip_suffix(EVAL_SUFFIX) {
        let without_suffix = dir.join(format!("{}.json", base));
        if without_suffix.is_file() {
            return Some(without_suffix);
        }
    }

    let fallback = dir.join(MAPPINGS_FILE_NAME);
    if fallback.is_file() {
        return Some(fallback);
    }

    None
}

/// Parse a mapping file
///
/// Keys that are not integers are skipped with a warning.
pub fn load_class_mapping<P: AsRef<Path>>(json_path: P) -> Result<ClassMapping, MappingError> {
    let path = json_path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MappingError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file: MappingFile = serde_json::from_str(&text).map_err(|source| MappingError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = file
        .classification
        .ok_or_else(|| MappingError::MissingClassification {
            path: path.to_path_buf(),
        })?;

    let mut mapping = ClassMapping::with_capacity(entries.len());
    for (key, name) in entries {
        match key.trim().parse::<i32>() {
            Ok(label) => {
                debug!("{} --> {}", label, name);
                mapping.insert(label, name);
            }
            Err(_) => warn!("Ignoring non-integer classification key '{}'", key),
        }
    }

    Ok(mapping)
}

/// Mapping for a data file, or an empty mapping if there is none
///
/// A sidecar that cannot be read or parsed is reported and then ignored.
pub fn class_mapping_for<P: AsRef<Path>>(data_path: P) -> ClassMapping {
    let Some(json_path) = resolve_sidecar(data_path) else {
        return ClassMapping::new();
    };

    info!("Reading classification information: {}", json_path.display());
    match load_class_mapping(&json_path) {
        Ok(mapping) => mapping,
        Err(e) => {
            warn!("{} (no mapping will be applied)", e);
            ClassMapping::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_co_named_sidecar() {
        let dir = TempDir::new().unwrap();
        let json = write(&dir, "scan.json", "{}");
        write(&dir, MAPPINGS_FILE_NAME, "{}");

        assert_eq!(resolve_sidecar(dir.path().join("scan.ply")), Some(json));
    }

    #[test]
    fn test_eval_suffix_is_stripped() {
        let dir = TempDir::new().unwrap();
        let json = write(&dir, "scan.json", "{}");

        assert_eq!(resolve_sidecar(dir.path().join("scan_eval.ply")), Some(json));

        // A co-named file still wins
        let eval_json = write(&dir, "scan_eval.json", "{}");
        assert_eq!(resolve_sidecar(dir.path().join("scan_eval.ply")), Some(eval_json));
    }

    #[test]
    fn test_directory_fallback() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_sidecar(dir.path().join("scan.ply")), None);

        let json = write(&dir, MAPPINGS_FILE_NAME, "{}");
        assert_eq!(resolve_sidecar(dir.path().join("scan.ply")), Some(json));
    }

    #[test]
    fn test_load_mapping() {
        let dir = TempDir::new().unwrap();
        let json = write(
            &dir,
            "scan.json",
            r#"{"classification": {"5": "ground", " 7 ": "building", "tree": "high_vegetation"}}"#,
        );

        let mapping = load_class_mapping(&json).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(&5).map(String::as_str), Some("ground"));
        assert_eq!(mapping.get(&7).map(String::as_str), Some("building"));
    }

    #[test]
    fn test_load_mapping_errors() {
        let dir = TempDir::new().unwrap();

        let missing_key = write(&dir, "a.json", r#"{"labels": {}}"#);
        assert!(matches!(
            load_class_mapping(&missing_key),
            Err(MappingError::MissingClassification { .. })
        ));

        let malformed = write(&dir, "b.json", "{ not json");
        assert!(matches!(load_class_mapping(&malformed), Err(MappingError::Json { .. })));

        assert!(matches!(
            load_class_mapping(dir.path().join("absent.json")),
            Err(MappingError::Io { .. })
        ));
    }

    #[test]
    fn test_class_mapping_for_recovers() {
        let dir = TempDir::new().unwrap();
        write(&dir, "scan.json", r#"{"other": 1}"#);
        assert!(class_mapping_for(dir.path().join("scan.ply")).is_empty());

        write(&dir, "tile.json", r#"{"classification": {"3": "ground"}}"#);
        let mapping = class_mapping_for(dir.path().join("tile.ply"));
        assert_eq!(mapping.get(&3).map(String::as_str), Some("ground"));
    }
}
