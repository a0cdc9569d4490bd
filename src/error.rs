//! Error types for transcript reconstruction.
//!
//! Only conditions that stop processing live here. Oddities in the input
//! stream are reported through [`crate::diagnostics`] and never surface as
//! an `Error`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("internal invariant violated in {operation}: column {col} lies beyond row length {len}")]
    Invariant {
        operation: &'static str,
        col: usize,
        len: usize,
    },

    #[error("internal invariant violated in {operation}: row {row} does not exist ({rows} rows)")]
    MissingRow {
        operation: &'static str,
        row: usize,
        rows: usize,
    },

    #[error("row {row} would grow to {width} columns, beyond the limit of {limit}")]
    RowTooLong {
        row: usize,
        width: usize,
        limit: usize,
    },

    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// True for errors that indicate a bug in the interpreter rather than
    /// a problem with its input or environment
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Invariant { .. } | Error::MissingRow { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
