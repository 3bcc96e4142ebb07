//! Canonical classification tables
//!
//! Two immutable tables drive label remapping:
//!
//! - [`TrainingCodes`] maps a class name (as used in sidecar mapping files) to
//!   the training code stored in [`PointSet::labels`](crate::PointSet).
//! - [`AsprsTable`] maps a raw ASPRS LAS classification to a training code and
//!   is used when a dataset ships without a mapping file.
//!
//! The canonical instances are built once per process and shared; callers that
//! need different vocabularies construct their own tables and pass them in.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Name of the class every unmapped label falls into
pub const UNASSIGNED: &str = "unassigned";

const CANONICAL_CODES: &[(&str, u8)] = &[
    (UNASSIGNED, 0),
    ("ground", 2),
    ("low_vegetation", 3),
    ("medium_vegetation", 4),
    ("high_vegetation", 5),
    ("building", 6),
    ("low_point", 7),
    ("water", 9),
    ("rail", 10),
    ("road_surface", 11),
    ("wire_guard", 13),
    ("wire_conductor", 14),
    ("transmission_tower", 15),
    ("wire_connector", 16),
    ("bridge_deck", 17),
    ("high_noise", 18),
];

// ASPRS standard classes 0..=18. Created/unclassified and the reserved
// slots collapse into unassigned.
const CANONICAL_ASPRS: &[(u8, &str)] = &[
    (0, UNASSIGNED),
    (1, UNASSIGNED),
    (2, "ground"),
    (3, "low_vegetation"),
    (4, "medium_vegetation"),
    (5, "high_vegetation"),
    (6, "building"),
    (7, "low_point"),
    (8, UNASSIGNED),
    (9, "water"),
    (10, "rail"),
    (11, "road_surface"),
    (12, UNASSIGNED),
    (13, "wire_guard"),
    (14, "wire_conductor"),
    (15, "transmission_tower"),
    (16, "wire_connector"),
    (17, "bridge_deck"),
    (18, "high_noise"),
];

/// Class name to training code table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingCodes {
    codes: HashMap<String, u8>,
    unassigned: u8,
}

impl TrainingCodes {
    /// Build a table from `(name, code)` pairs
    ///
    /// Returns `None` if the pairs do not define [`UNASSIGNED`].
    pub fn from_pairs<I, S>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, u8)>,
        S: Into<String>,
    {
        let codes: HashMap<String, u8> = pairs
            .into_iter()
            .map(|(name, code)| (name.into(), code))
            .collect();
        let unassigned = *codes.get(UNASSIGNED)?;
        Some(Self { codes, unassigned })
    }

    /// The process-wide canonical table
    pub fn canonical() -> &'static TrainingCodes {
        static CODES: OnceLock<TrainingCodes> = OnceLock::new();
        CODES.get_or_init(|| Self {
            codes: CANONICAL_CODES
                .iter()
                .map(|&(name, code)| (name.to_string(), code))
                .collect(),
            unassigned: 0,
        })
    }

    /// Training code for a class name
    pub fn get(&self, name: &str) -> Option<u8> {
        self.codes.get(name).copied()
    }

    /// Training code of the unassigned class
    pub fn unassigned(&self) -> u8 {
        self.unassigned
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Raw ASPRS classification to training code table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsprsTable {
    table: [Option<u8>; 256],
}

impl AsprsTable {
    /// Build a table from `(asprs_class, training_code)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut table = [None; 256];
        for (raw, code) in pairs {
            table[raw as usize] = Some(code);
        }
        Self { table }
    }

    /// The process-wide canonical table, resolved against
    /// [`TrainingCodes::canonical`]
    pub fn canonical() -> &'static AsprsTable {
        static TABLE: OnceLock<AsprsTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let codes = TrainingCodes::canonical();
            Self::from_pairs(CANONICAL_ASPRS.iter().map(|&(raw, name)| {
                (raw, codes.get(name).unwrap_or(codes.unassigned()))
            }))
        })
    }

    /// Training code for a raw classification, if the table defines one
    pub fn get(&self, raw: u8) -> Option<u8> {
        self.table[raw as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_training_codes() {
        let codes = TrainingCodes::canonical();
        assert_eq!(codes.unassigned(), 0);
        assert_eq!(codes.get("ground"), Some(2));
        assert_eq!(codes.get("building"), Some(6));
        assert_eq!(codes.get("water"), Some(9));
        assert_eq!(codes.get("trees"), None);
        assert_eq!(codes.len(), CANONICAL_CODES.len());
    }

    #[test]
    fn test_canonical_asprs_table() {
        let table = AsprsTable::canonical();
        assert_eq!(table.get(0), Some(0));
        assert_eq!(table.get(1), Some(0));
        assert_eq!(table.get(2), Some(2));
        assert_eq!(table.get(6), Some(6));
        assert_eq!(table.get(8), Some(0));
        assert_eq!(table.get(12), Some(0));
        assert_eq!(table.get(18), Some(18));
        assert_eq!(table.get(19), None);
        assert_eq!(table.get(255), None);
    }

    #[test]
    fn test_custom_training_codes_need_unassigned() {
        assert!(TrainingCodes::from_pairs([("ground", 2u8)]).is_none());

        let codes = TrainingCodes::from_pairs([("ground", 2u8), (UNASSIGNED, 0)]).unwrap();
        assert_eq!(codes.get("ground"), Some(2));
        assert_eq!(codes.unassigned(), 0);
    }

    #[test]
    fn test_custom_asprs_table() {
        let table = AsprsTable::from_pairs([(2, 1), (6, 3)]);
        assert_eq!(table.get(2), Some(1));
        assert_eq!(table.get(6), Some(3));
        assert_eq!(table.get(5), None);
    }
}
