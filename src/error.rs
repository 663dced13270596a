use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Error type returned by the column parser and the pipeline.
///
/// This is a single error enum shared across validation, per-file parsing and
/// the final reduction. Every error is fatal to the run: the pipeline returns
/// the first one it observes and writes nothing to the output sink.
#[derive(Debug, Error)]
pub enum StatsError {
    /// No input files were provided.
    #[error("no input files")]
    NoFiles,

    /// The operation token is not one of the supported reductions.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The requested 1-based column index is invalid (i.e. zero).
    #[error("invalid column: {0}")]
    InvalidColumn(usize),

    /// A row has fewer fields than the requested column requires.
    #[error("invalid column {column}: row has only {fields} fields")]
    ColumnOutOfRange { column: usize, fields: usize },

    /// A field at the target column could not be parsed as a number.
    #[error("not a number at row {row} (raw='{raw}'): {source}")]
    NotANumber {
        row: usize,
        raw: String,
        source: std::num::ParseFloatError,
    },

    /// An input file could not be opened.
    #[error("cannot open file '{}': {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading rows from an input stream failed for a reason other than
    /// clean end-of-input.
    #[error("cannot read data from file: {0}")]
    Read(#[from] csv::Error),

    /// Writing the final result to the output sink failed.
    #[error("cannot write result: {0}")]
    Write(#[source] std::io::Error),
}
