pub mod column;
pub mod error;
pub mod value;

pub use column::{ColumnSchema, ColumnType, DEFAULT_SCALE, ValueFormat};
pub use error::{Result, SchemaError};
pub use value::CellValue;
