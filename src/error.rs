//! Error handling for datem file operations.
//!
//! Provides error types with file and line context for script generation,
//! datem serialization and parsing failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatemError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Parse error in {path}:{line}: field '{field}' has invalid value '{value}'")]
    Parse {
        path: PathBuf,
        line: usize,
        field: String,
        value: String,
    },

    #[error("Column count mismatch in {path}:{line}: expected at most {expected} fields, found {found}")]
    ColumnCount {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error(
        "Invalid date in {path}:{line}: year={year} month={month} day={day} hhmm={hhmm}"
    )]
    InvalidDate {
        path: PathBuf,
        line: usize,
        year: i64,
        month: i64,
        day: i64,
        hhmm: i64,
    },

    /// Date construction failed while reading a merged file. Callers are
    /// expected to stop processing when they see this.
    #[error("EXCEPTION {path} (line {line})\n{sample}")]
    MergedDate {
        path: PathBuf,
        line: usize,
        sample: String,
    },

    #[error("Unsupported station id type: {dtype}")]
    UnsupportedStationId { dtype: String },

    #[error("Column '{column}' has unsupported type {dtype}")]
    ColumnType { column: String, dtype: String },

    #[error("Column '{column}' has a missing value at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid sampling interval for station {station}: {hours} hours")]
    InvalidInterval { station: usize, hours: i64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DatemError {
    /// Whether the error should end processing outright rather than be
    /// reported and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DatemError::MergedDate { .. })
    }
}

pub type Result<T> = std::result::Result<T, DatemError>;
