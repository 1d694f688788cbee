//! Mixture source trait and its error type.
//!
//! Anything that can produce a [`MixtureTable`] implements [`MixtureSource`].
//! The builder only sees this trait, so tests and embedders can hand it an
//! in-memory table instead of a file on disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parser::load_mixture;
use crate::table::MixtureTable;

/// File name used when no mixture table is configured.
pub const DEFAULT_MIXTURE_FILE: &str = "metal-mix.cfg";

/// Errors from reading a mixture table.
///
/// Both variants are configuration problems: nothing is retried and no
/// default mixture is substituted.
#[derive(Debug, Error)]
pub enum MixtureError {
    #[error("Can't open mixture table {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Syntax error in mixture table {}, line {line}: {message}", .path.display())]
    ConfigSyntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl MixtureError {
    /// File the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::ConfigUnreadable { path, .. } | Self::ConfigSyntax { path, .. } => path,
        }
    }

    /// 1-based line number, for syntax errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::ConfigUnreadable { .. } => None,
            Self::ConfigSyntax { line, .. } => Some(*line),
        }
    }
}

/// Provides a heavy-element mixture table.
pub trait MixtureSource: Send + Sync {
    /// Human-readable description used in log messages.
    fn describe(&self) -> String;

    /// Produce the table. Each call reads the source afresh.
    fn load(&self) -> Result<MixtureTable, MixtureError>;
}

/// A mixture table stored as a plain-text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixtureFile {
    path: PathBuf,
}

impl MixtureFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for MixtureFile {
    fn default() -> Self {
        Self::new(DEFAULT_MIXTURE_FILE)
    }
}

impl MixtureSource for MixtureFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<MixtureTable, MixtureError> {
        load_mixture(&self.path)
    }
}

impl MixtureSource for MixtureTable {
    fn describe(&self) -> String {
        format!("in-memory mixture ({} entries)", self.len())
    }

    fn load(&self) -> Result<MixtureTable, MixtureError> {
        Ok(self.clone())
    }
}

impl<S: MixtureSource + ?Sized> MixtureSource for &S {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn load(&self) -> Result<MixtureTable, MixtureError> {
        (**self).load()
    }
}
