//! Initial chemical composition of a stellar model.
//!
//! Given the hydrogen mass fraction $X$, the metallicity $Z$ and a
//! heavy-element mixture table, the builder fills a [`CompositionMap`]:
//!
//! 1. $Y = 1 - (X + Z)$
//! 2. $X_{\text{H}} = X$
//! 3. $X_{^3\text{He}} = r Y$ with $r$ = [`HE3_MASS_RATIO`], $X_{^4\text{He}} = Y - X_{^3\text{He}}$
//! 4. $X_i = Z f_i$ for every entry $(i, f_i)$ of the mixture table
//! 5. $X_{\text{Ex}} = 1 - \sum_s X_s$
//!
//! The last step makes the fractions sum to one at every grid point
//! whatever the table contains. No species is clamped: a table whose
//! fractions total more than one yields a negative residual.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use nucleo_mixture::{MixtureFile, MixtureSource, DEFAULT_MIXTURE_FILE};

use crate::composition::{CompositionError, CompositionMap, HELIUM_3, HELIUM_4, HYDROGEN, RESIDUAL};
use crate::field::GridShape;

/// Mass fraction of helium carried by ³He.
pub const HE3_MASS_RATIO: f64 = 3.15247417638132e-04;

/// Builds initial compositions from a mixture source.
///
/// Holds no state between calls; each [`build`](Self::build) reads the
/// mixture source afresh and returns a new map.
#[derive(Debug, Clone)]
pub struct InitialComposition<S: MixtureSource> {
    /// Where the heavy-element mixture comes from.
    pub mixture: S,
    /// Grid the abundance fields are defined on.
    pub grid: GridShape,
}

impl<S: MixtureSource> InitialComposition<S> {
    /// Builder on a single-point grid.
    pub fn new(mixture: S) -> Self {
        Self {
            mixture,
            grid: GridShape::default(),
        }
    }

    pub fn with_grid(mut self, grid: GridShape) -> Self {
        self.grid = grid;
        self
    }

    /// Build the composition for hydrogen fraction `x` and metallicity `z`.
    ///
    /// Fails if the mixture table cannot be read or contains a malformed
    /// line; no partially filled map is returned in that case.
    pub fn build(&self, x: f64, z: f64) -> Result<CompositionMap, CompositionError> {
        check_bulk_fractions(x, z);

        let y = 1.0 - (x + z);
        let he3 = HE3_MASS_RATIO * y;
        let he4 = y - he3;

        let mut comp = CompositionMap::new(self.grid);
        comp.set_uniform(HYDROGEN, x)?;
        comp.set_uniform(HELIUM_3, he3)?;
        comp.set_uniform(HELIUM_4, he4)?;

        log::debug!("Reading metal mixture from {}", self.mixture.describe());
        let table = self.mixture.load()?;

        let total = table.total_fraction();
        if total > 1.0 {
            log::warn!(
                "Mixture fractions from {} total {:.6} > 1; residual '{}' will be negative",
                self.mixture.describe(),
                total,
                RESIDUAL
            );
        }

        for entry in &table {
            if is_bulk_species(&entry.label) {
                log::warn!(
                    "Mixture entry '{}' (line {}) overrides the bulk abundance",
                    entry.label,
                    entry.line
                );
            }
            comp.set_uniform(entry.label.as_str(), z * entry.fraction_of_z)?;
        }

        let residual = 1.0 - &comp.sum();
        comp.set(RESIDUAL, residual)?;

        log::debug!(
            "Initial composition: X={}, Y={}, Z={}, {} species, normalisation error {:.2e}",
            x,
            y,
            z,
            comp.len(),
            comp.normalization_error()
        );
        Ok(comp)
    }
}

/// Build a composition on a single-point grid from a mixture-table file.
pub fn initial_composition(
    x: f64,
    z: f64,
    mixture_table: impl Into<PathBuf>,
) -> Result<CompositionMap, CompositionError> {
    InitialComposition::new(MixtureFile::new(mixture_table)).build(x, z)
}

/// Serializable inputs of an initial composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionParams {
    /// Hydrogen mass fraction $X$.
    pub hydrogen_fraction: f64,
    /// Metallicity $Z$.
    pub metallicity: f64,
    /// Path of the mixture-table file.
    #[serde(default = "default_mixture_table")]
    pub mixture_table: PathBuf,
    #[serde(default)]
    pub grid: GridShape,
}

fn default_mixture_table() -> PathBuf {
    PathBuf::from(DEFAULT_MIXTURE_FILE)
}

impl Default for CompositionParams {
    /// Roughly solar bulk values with the default mixture file.
    fn default() -> Self {
        Self {
            hydrogen_fraction: 0.7,
            metallicity: 0.02,
            mixture_table: default_mixture_table(),
            grid: GridShape::default(),
        }
    }
}

/// Build a composition from [`CompositionParams`].
pub fn build_from_params(params: &CompositionParams) -> Result<CompositionMap, CompositionError> {
    InitialComposition::new(MixtureFile::new(params.mixture_table.clone()))
        .with_grid(params.grid)
        .build(params.hydrogen_fraction, params.metallicity)
}

fn is_bulk_species(label: &str) -> bool {
    matches!(label, HYDROGEN | HELIUM_3 | HELIUM_4)
}

// Out-of-range inputs are reported, not rejected.
fn check_bulk_fractions(x: f64, z: f64) {
    if !(0.0..=1.0).contains(&x) {
        log::warn!("Hydrogen fraction X={} is outside [0, 1]", x);
    }
    if !(0.0..=1.0).contains(&z) {
        log::warn!("Metallicity Z={} is outside [0, 1]", z);
    }
    if x + z > 1.0 {
        log::warn!("X + Z = {} exceeds 1; helium fraction will be negative", x + z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nucleo_mixture::MixtureTable;

    #[test]
    fn test_helium_split() {
        let builder = InitialComposition::new(MixtureTable::new());
        let comp = builder.build(0.7, 0.02).unwrap();
        let he3 = comp.get(HELIUM_3).unwrap().mean();
        let he4 = comp.get(HELIUM_4).unwrap().mean();
        assert_relative_eq!(he3, HE3_MASS_RATIO * 0.28, epsilon = 1e-18);
        assert_relative_eq!(he3 + he4, 0.28, epsilon = 1e-15);
    }

    #[test]
    fn test_table_entries_scaled_by_z() {
        let table = MixtureTable::from_pairs([("O", 0.5), ("C", 0.3)]);
        let comp = InitialComposition::new(table).build(0.7, 0.02).unwrap();
        assert_relative_eq!(comp.get("O").unwrap().mean(), 0.01, epsilon = 1e-16);
        assert_relative_eq!(comp.get("C").unwrap().mean(), 0.006, epsilon = 1e-16);
        assert_relative_eq!(comp.get(RESIDUAL).unwrap().mean(), 0.004, epsilon = 1e-14);
    }

    #[test]
    fn test_grid_is_uniform() {
        let table = MixtureTable::from_pairs([("O", 0.5)]);
        let comp = InitialComposition::new(table)
            .with_grid(GridShape::new(5, 3))
            .build(0.7, 0.02)
            .unwrap();
        assert_eq!(comp.grid(), GridShape::new(5, 3));
        for (_, field) in comp.iter() {
            assert_eq!(field.shape(), GridShape::new(5, 3));
            assert_eq!(field.min(), field.max());
        }
        assert!(comp.normalization_error() < 1e-12);
    }

    #[test]
    fn test_overfull_table_gives_negative_residual() {
        let table = MixtureTable::from_pairs([("O", 0.9), ("C", 0.6)]);
        let comp = InitialComposition::new(table).build(0.7, 0.02).unwrap();
        assert!(comp.get(RESIDUAL).unwrap().mean() < 0.0);
        assert!(comp.normalization_error() < 1e-12);
    }

    #[test]
    fn test_table_may_override_hydrogen() {
        let table = MixtureTable::from_pairs([("H", 0.5)]);
        let comp = InitialComposition::new(table).build(0.7, 0.02).unwrap();
        assert_relative_eq!(comp.x().unwrap().mean(), 0.01, epsilon = 1e-16);
        assert!(comp.normalization_error() < 1e-12);
    }

    #[test]
    fn test_nan_hydrogen_reported_in_normalization_error() {
        let table = MixtureTable::from_pairs([("O", 0.5)]);
        let comp = InitialComposition::new(table).build(f64::NAN, 0.02).unwrap();
        assert!(comp.get(RESIDUAL).unwrap().mean().is_nan());
        assert!(comp.normalization_error().is_nan());
    }

    #[test]
    fn test_nan_table_entry_is_not_applied() {
        let table = MixtureTable::from_pairs([("O", f64::NAN), ("C", 0.3)]);
        let comp = InitialComposition::new(table).build(0.7, 0.02).unwrap();
        assert!(!comp.contains("O"));
        assert_relative_eq!(comp.get(RESIDUAL).unwrap().mean(), 0.014, epsilon = 1e-14);
        assert!(comp.normalization_error() < 1e-12);
    }

    #[test]
    fn test_params_defaults() {
        let params = CompositionParams::default();
        assert_eq!(params.mixture_table, PathBuf::from("metal-mix.cfg"));
        assert_eq!(params.grid, GridShape::new(1, 1));
    }
}
