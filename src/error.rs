/// Error types shared by every stage of the curation pipeline.

use thiserror::Error;

/// Errors raised while building, canonicalizing, filtering or exporting tables.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    #[error("Duplicate column '{column}' produced by headers {sources:?}")]
    DuplicateColumn { column: String, sources: Vec<String> },

    #[error("Column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row} out of range [0, {len})")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Row has {actual} values, table has {expected} columns")]
    RowArity { expected: usize, actual: usize },

    #[error("CSV file '{0}' has no header row")]
    EmptyCsv(String),

    #[error("Line {line} has {actual} fields, header has {expected}")]
    RecordTooLong {
        line: u64,
        expected: usize,
        actual: usize,
    },

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid alias table: {0}")]
    AliasConfig(String),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type TableResult<T> = Result<T, TableError>;
