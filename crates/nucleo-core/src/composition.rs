//! Composition map: per-species abundance fields.
//!
//! A [`CompositionMap`] stores one [`AbundanceField`] per species label.
//! The bulk quantities are derived, not stored:
//!
//! $$
//! X = X_{\text{H}}, \qquad Y = X_{^3\text{He}} + X_{^4\text{He}}, \qquad Z = 1 - X - Y
//! $$
//!
//! Maps produced by the initial composition builder satisfy
//! $\sum_s X_s = 1$ at every grid point, the residual species
//! [`RESIDUAL`] absorbing any shortfall.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nucleo_mixture::MixtureError;

use crate::field::{AbundanceField, GridShape};

/// Hydrogen.
pub const HYDROGEN: &str = "H";
/// Helium-3.
pub const HELIUM_3: &str = "He3";
/// Helium-4.
pub const HELIUM_4: &str = "He4";
/// Normalisation residual, not a physical species.
pub const RESIDUAL: &str = nucleo_mixture::RESERVED_LABEL;

/// Errors from building or querying a composition.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Species '{0}' is not present in the composition")]
    MissingSpecies(String),

    #[error("Field for '{label}' has shape {found:?}, composition grid is {expected:?}")]
    ShapeMismatch {
        label: String,
        expected: GridShape,
        found: GridShape,
    },

    #[error(transparent)]
    Mixture(#[from] MixtureError),
}

/// Mass-fraction fields keyed by species label.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionMap {
    grid: GridShape,
    species: BTreeMap<String, AbundanceField>,
}

impl CompositionMap {
    /// Empty composition on the given grid.
    pub fn new(grid: GridShape) -> Self {
        Self {
            grid,
            species: BTreeMap::new(),
        }
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    /// Field for `label`.
    ///
    /// Unknown labels are an error rather than an implicit zero field, so a
    /// misspelt species cannot silently read as absent.
    pub fn get(&self, label: &str) -> Result<&AbundanceField, CompositionError> {
        self.species
            .get(label)
            .ok_or_else(|| CompositionError::MissingSpecies(label.to_string()))
    }

    /// Insert or overwrite the field for `label`.
    ///
    /// Values are not range-checked; only the grid shape must match.
    pub fn set(
        &mut self,
        label: impl Into<String>,
        field: AbundanceField,
    ) -> Result<(), CompositionError> {
        let label = label.into();
        if field.shape() != self.grid {
            return Err(CompositionError::ShapeMismatch {
                label,
                expected: self.grid,
                found: field.shape(),
            });
        }
        self.species.insert(label, field);
        Ok(())
    }

    /// Set `label` to the same value at every grid point.
    pub fn set_uniform(
        &mut self,
        label: impl Into<String>,
        value: f64,
    ) -> Result<(), CompositionError> {
        let field = AbundanceField::uniform(self.grid, value);
        self.set(label, field)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.species.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Species labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AbundanceField)> {
        self.species.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Point-wise sum over every stored species, the residual included.
    pub fn sum(&self) -> AbundanceField {
        self.species
            .values()
            .fold(AbundanceField::zeros(self.grid), |acc, f| &acc + f)
    }

    /// Hydrogen mass fraction $X$.
    pub fn x(&self) -> Result<AbundanceField, CompositionError> {
        Ok(self.get(HYDROGEN)?.clone())
    }

    /// Helium mass fraction $Y$ (both isotopes).
    pub fn y(&self) -> Result<AbundanceField, CompositionError> {
        Ok(self.get(HELIUM_3)? + self.get(HELIUM_4)?)
    }

    /// Metallicity $Z = 1 - X - Y$.
    ///
    /// Computed from the stored fields, so it can drift from the $Z$ the
    /// composition was built with if the mixture table does not sum to one.
    pub fn z(&self) -> Result<AbundanceField, CompositionError> {
        Ok(1.0 - &(self.x()? + self.y()?))
    }

    /// Largest departure of $\sum_s X_s$ from 1 over the grid.
    pub fn normalization_error(&self) -> f64 {
        self.sum().max_abs_deviation(1.0)
    }

    /// Grid-averaged view of the composition for reporting.
    pub fn summary(&self) -> Result<CompositionSummary, CompositionError> {
        let species = self
            .iter()
            .map(|(label, field)| SpeciesSummary {
                label: label.to_string(),
                mean: field.mean(),
                min: field.min(),
                max: field.max(),
            })
            .collect();

        Ok(CompositionSummary {
            grid: self.grid,
            x: self.x()?.mean(),
            y: self.y()?.mean(),
            z: self.z()?.mean(),
            normalization_error: self.normalization_error(),
            species,
        })
    }
}

/// Grid statistics for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSummary {
    pub label: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Bulk quantities of a composition, averaged over the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSummary {
    pub grid: GridShape,
    /// Mean hydrogen mass fraction.
    pub x: f64,
    /// Mean helium mass fraction.
    pub y: f64,
    /// Mean metallicity.
    pub z: f64,
    /// Max $|\sum_s X_s - 1|$ over the grid.
    pub normalization_error: f64,
    /// Per-species statistics, sorted by label.
    pub species: Vec<SpeciesSummary>,
}
