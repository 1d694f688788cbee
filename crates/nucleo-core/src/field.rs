//! Abundance fields over the stellar grid.
//!
//! An [`AbundanceField`] holds one value per grid point, laid out as an
//! `(nr, nth)` array: `nr` radial points by `nth` angular points. Initial
//! compositions are spatially uniform, but nothing here assumes so and later
//! physics may make the field vary from point to point.

use std::ops::{Add, Mul, Sub};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Dimensions of the stellar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of radial points.
    pub nr: usize,
    /// Number of angular points.
    pub nth: usize,
}

impl GridShape {
    pub fn new(nr: usize, nth: usize) -> Self {
        Self { nr, nth }
    }

    /// Total number of grid points.
    pub fn points(&self) -> usize {
        self.nr * self.nth
    }

    fn dim(&self) -> (usize, usize) {
        (self.nr, self.nth)
    }
}

impl Default for GridShape {
    /// A single point, i.e. a bulk (zero-dimensional) value.
    fn default() -> Self {
        Self { nr: 1, nth: 1 }
    }
}

/// Mass fraction of one species at every grid point.
///
/// Arithmetic between two fields is element-wise and requires matching
/// shapes; mismatched shapes panic.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceField {
    values: Array2<f64>,
}

impl AbundanceField {
    /// Field with the same value at every point.
    pub fn uniform(shape: GridShape, value: f64) -> Self {
        Self {
            values: Array2::from_elem(shape.dim(), value),
        }
    }

    pub fn zeros(shape: GridShape) -> Self {
        Self::uniform(shape, 0.0)
    }

    pub fn from_array(values: Array2<f64>) -> Self {
        Self { values }
    }

    pub fn shape(&self) -> GridShape {
        let (nr, nth) = self.values.dim();
        GridShape { nr, nth }
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Value at radial index `ir`, angular index `ith`.
    pub fn at(&self, ir: usize, ith: usize) -> Option<f64> {
        self.values.get((ir, ith)).copied()
    }

    /// Sum over all grid points.
    pub fn total(&self) -> f64 {
        self.values.sum()
    }

    /// Arithmetic mean over the grid (0 for an empty grid).
    pub fn mean(&self) -> f64 {
        self.values.mean().unwrap_or(0.0)
    }

    /// Smallest value; NaN if any point is NaN.
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, nan_min)
    }

    /// Largest value; NaN if any point is NaN.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, nan_max)
    }

    /// Largest $|f_i - v|$ over the grid; NaN if any point is NaN.
    pub fn max_abs_deviation(&self, value: f64) -> f64 {
        self.values
            .iter()
            .map(|&f| (f - value).abs())
            .fold(0.0, nan_max)
    }

    fn check_shape(&self, other: &Self, op: &str) {
        assert_eq!(
            self.shape(),
            other.shape(),
            "Cannot {} abundance fields of different shapes",
            op
        );
    }
}

// `f64::max`/`f64::min` drop NaN operands; these keep them.
fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

impl Add<&AbundanceField> for &AbundanceField {
    type Output = AbundanceField;

    fn add(self, rhs: &AbundanceField) -> AbundanceField {
        self.check_shape(rhs, "add");
        AbundanceField::from_array(&self.values + &rhs.values)
    }
}

impl Add for AbundanceField {
    type Output = AbundanceField;

    fn add(self, rhs: AbundanceField) -> AbundanceField {
        &self + &rhs
    }
}

impl Sub<&AbundanceField> for &AbundanceField {
    type Output = AbundanceField;

    fn sub(self, rhs: &AbundanceField) -> AbundanceField {
        self.check_shape(rhs, "subtract");
        AbundanceField::from_array(&self.values - &rhs.values)
    }
}

impl Sub for AbundanceField {
    type Output = AbundanceField;

    fn sub(self, rhs: AbundanceField) -> AbundanceField {
        &self - &rhs
    }
}

impl Mul<f64> for &AbundanceField {
    type Output = AbundanceField;

    fn mul(self, rhs: f64) -> AbundanceField {
        AbundanceField::from_array(&self.values * rhs)
    }
}

impl Mul<f64> for AbundanceField {
    type Output = AbundanceField;

    fn mul(self, rhs: f64) -> AbundanceField {
        &self * rhs
    }
}

impl Mul<&AbundanceField> for f64 {
    type Output = AbundanceField;

    fn mul(self, rhs: &AbundanceField) -> AbundanceField {
        rhs * self
    }
}

// Scalar broadcast, used for `1 - sum`.
impl Sub<&AbundanceField> for f64 {
    type Output = AbundanceField;

    fn sub(self, rhs: &AbundanceField) -> AbundanceField {
        AbundanceField::from_array(rhs.values.mapv(|v| self - v))
    }
}

impl Sub<AbundanceField> for f64 {
    type Output = AbundanceField;

    fn sub(self, rhs: AbundanceField) -> AbundanceField {
        self - &rhs
    }
}
