//! Translation of raw classification labels into training codes

use crate::mapping::ClassMapping;
use pointclass_core::{AsprsTable, Error, PointSet, Result, TrainingCodes};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Rewrites the labels of a point set into training codes
///
/// With a non-empty [`ClassMapping`] each raw label goes through its class
/// name; labels without an entry, and names the training table does not know,
/// become unassigned. With an empty mapping the ASPRS table is applied
/// directly.
#[derive(Debug, Clone, Copy)]
pub struct LabelRemapper<'a> {
    training_codes: &'a TrainingCodes,
    asprs: &'a AsprsTable,
}

impl<'a> LabelRemapper<'a> {
    pub fn new(training_codes: &'a TrainingCodes, asprs: &'a AsprsTable) -> Self {
        Self {
            training_codes,
            asprs,
        }
    }

    /// Remapper over the canonical tables
    pub fn canonical() -> LabelRemapper<'static> {
        LabelRemapper::new(TrainingCodes::canonical(), AsprsTable::canonical())
    }

    /// Rewrite `set.labels` in place
    ///
    /// Sets without labels are left alone. On error the labels are unchanged.
    pub fn remap(&self, set: &mut PointSet, mapping: &ClassMapping) -> Result<()> {
        if !set.has_labels() {
            return Ok(());
        }

        let lookup = if mapping.is_empty() {
            self.asprs_lookup(&set.labels)?
        } else {
            self.mapping_lookup(mapping)
        };

        for label in set.labels.iter_mut() {
            *label = lookup[*label as usize];
        }

        debug!("Remapped {} labels", set.labels.len());
        Ok(())
    }

    /// Raw label → training code for every byte value
    fn mapping_lookup(&self, mapping: &ClassMapping) -> [u8; 256] {
        let unassigned = self.training_codes.unassigned();
        let mut lookup = [unassigned; 256];
        let mut unknown_names = BTreeSet::new();

        for (&raw, name) in mapping {
            let Ok(raw) = u8::try_from(raw) else {
                continue;
            };
            lookup[raw as usize] = match self.training_codes.get(name) {
                Some(code) => code,
                None => {
                    unknown_names.insert(name.as_str());
                    unassigned
                }
            };
        }

        for name in unknown_names {
            warn!("Unknown class '{}', treating as unassigned", name);
        }

        lookup
    }

    fn asprs_lookup(&self, labels: &[u8]) -> Result<[u8; 256]> {
        if let Some(&raw) = labels.iter().find(|&&raw| self.asprs.get(raw).is_none()) {
            return Err(Error::Format(format!(
                "classification {} has no training code",
                raw
            )));
        }

        let mut lookup = [0u8; 256];
        for (raw, code) in lookup.iter_mut().enumerate() {
            *code = self.asprs.get(raw as u8).unwrap_or(0);
        }
        Ok(lookup)
    }
}
