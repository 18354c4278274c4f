//! Error types
//!
//! Placement outcomes are not errors; they are reported through
//! [`DropOutcome`](crate::game::DropOutcome).

use thiserror::Error;

use crate::pattern::Cell;

/// A pattern definition that breaks a catalog invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PatternError {
    #[error("pattern {id:?}: grid size must be at least 1")]
    EmptyGrid { id: String },

    #[error("pattern {id:?}: cell ({}, {}) is outside a {grid}x{grid} grid", cell.row, cell.col)]
    OutOfBounds { id: String, grid: u32, cell: Cell },

    #[error("pattern {id:?}: more than one shape at ({}, {})", cell.row, cell.col)]
    DuplicateCell { id: String, cell: Cell },
}

/// Failure to load the pattern catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Errors surfaced by key/value storage backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("storage write rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Rejected progress import. The store is left untouched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("invalid file: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("invalid file: expected a JSON object")]
    NotAnObject,
}

/// Malformed CSV progress data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CsvError {
    #[error("missing header row")]
    MissingHeader,

    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: expected 5 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: {field} is not a number: {value:?}")]
    NotANumber {
        line: usize,
        field: &'static str,
        value: String,
    },
}
