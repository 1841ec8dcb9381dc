use thiserror::Error;

use stattab_model::SchemaError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("table is not initialized; call initialize() before inserting rows")]
    NotInitialized,
    #[error("table is already initialized")]
    AlreadyInitialized,
    #[error("row {0:?} already exists")]
    DuplicateRow(String),
    #[error("column {0:?} is the identity column; supply it as the row name, not row data")]
    IdentityInRowData(String),
    #[error("row {0:?} does not exist")]
    RowNotFound(String),
    #[error("row has {found} values but the table has {expected} columns")]
    TooManyValues { expected: usize, found: usize },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
