//! # Nucleo Mixture
//!
//! Heavy-element mixture tables for the Nucleo framework. A mixture table
//! gives, for each tracked metal, its mass fraction as a multiple of the
//! total metallicity $Z$. The initial composition builder in `nucleo-core`
//! scales every entry by $Z$ to obtain the species abundances.
//!
//! ## Sources
//!
//! All tables are obtained through the [`MixtureSource`](provider::MixtureSource)
//! trait:
//!
//! | Source | Type | Notes |
//! |--------|------|-------|
//! | Plain-text file | [`provider::MixtureFile`] | Default name `metal-mix.cfg` |
//! | In-memory table | [`table::MixtureTable`] | Built with [`table::MixtureTable::from_pairs`] |
//!
//! ## File format
//!
//! See [`parser`] for the line grammar. Errors carry the file name and, for
//! syntax problems, the 1-based line number.

pub mod parser;
pub mod provider;
pub mod table;

pub use parser::{load_mixture, parse_mixture, read_mixture};
pub use provider::{MixtureError, MixtureFile, MixtureSource, DEFAULT_MIXTURE_FILE};
pub use table::{MixtureEntry, MixtureTable, RESERVED_LABEL};
