//! # Nucleo Core
//!
//! Initial chemical composition for stellar models. This crate turns two
//! bulk parameters, the hydrogen mass fraction $X$ and the metallicity $Z$,
//! plus a heavy-element mixture table into per-species mass-fraction fields
//! over the stellar grid.
//!
//! ## Modules
//!
//! - [`field`] — Abundance fields on an `(nr, nth)` grid.
//! - [`composition`] — The species-keyed [`CompositionMap`] and its derived
//!   $X$, $Y$, $Z$ accessors.
//! - [`builder`] — [`InitialComposition`], which fills a map from $(X, Z)$
//!   and a [`MixtureSource`](nucleo_mixture::MixtureSource).
//!
//! ## Example
//!
//! ```
//! use nucleo_core::builder::InitialComposition;
//! use nucleo_mixture::MixtureTable;
//!
//! let mixture = MixtureTable::from_pairs([("O", 0.5), ("C", 0.3)]);
//! let comp = InitialComposition::new(mixture).build(0.70, 0.02).unwrap();
//!
//! assert!((comp.get("O").unwrap().mean() - 0.01).abs() < 1e-15);
//! assert!(comp.normalization_error() < 1e-12);
//! ```

pub mod builder;
pub mod composition;
pub mod field;

pub use builder::{build_from_params, initial_composition, CompositionParams, InitialComposition};
pub use composition::{CompositionError, CompositionMap, CompositionSummary};
pub use field::{AbundanceField, GridShape};
