use thiserror::Error;

/// Structural schema violations. Value-coercion problems are never errors;
/// they are absorbed at render time with defined fallbacks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column {0:?} is already registered")]
    DuplicateColumn(String),
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error("table has no registered columns")]
    NoColumns,
}

pub type Result<T> = std::result::Result<T, SchemaError>;
