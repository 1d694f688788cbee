//! In-memory mixture table.

use std::collections::BTreeMap;

/// Species label reserved for the normalisation residual. Tables may not
/// assign it.
pub const RESERVED_LABEL: &str = "Ex";

/// One heavy element from a mixture table.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureEntry {
    /// Species label, e.g. `"O"` or `"Fe56"`.
    pub label: String,
    /// Mass fraction of this species divided by the total metallicity.
    pub fraction_of_z: f64,
    /// 1-based line the entry came from.
    pub line: usize,
}

/// Heavy-element entries in the order they were read.
///
/// Duplicate labels are kept; when the table is applied the last entry for
/// a label wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixtureTable {
    entries: Vec<MixtureEntry>,
}

impl MixtureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(label, fraction_of_z)` pairs.
    ///
    /// Line numbers are assigned from the pair position. Pairs using the
    /// reserved residual label, or with a non-finite fraction, are dropped
    /// with a warning.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (idx, (label, fraction_of_z)) in pairs.into_iter().enumerate() {
            let label = label.into();
            if label == RESERVED_LABEL {
                log::warn!("Ignoring mixture entry '{}': label is reserved", label);
                continue;
            }
            if !fraction_of_z.is_finite() {
                log::warn!(
                    "Ignoring mixture entry '{}': fraction {} is not finite",
                    label,
                    fraction_of_z
                );
                continue;
            }
            table.push(MixtureEntry {
                label,
                fraction_of_z,
                line: idx + 1,
            });
        }
        table
    }

    pub(crate) fn push(&mut self, entry: MixtureEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MixtureEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MixtureEntry> {
        self.entries.iter()
    }

    /// Effective fraction for `label` (the last entry wins).
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.label == label)
            .map(|e| e.fraction_of_z)
    }

    /// Sum of the effective fractions over distinct labels.
    ///
    /// A value above 1 means the scaled metals exceed $Z$ and the residual
    /// will come out negative.
    pub fn total_fraction(&self) -> f64 {
        let mut effective: BTreeMap<&str, f64> = BTreeMap::new();
        for entry in &self.entries {
            effective.insert(entry.label.as_str(), entry.fraction_of_z);
        }
        effective.values().sum()
    }
}

impl<'a> IntoIterator for &'a MixtureTable {
    type Item = &'a MixtureEntry;
    type IntoIter = std::slice::Iter<'a, MixtureEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
