pub mod error;
pub mod table;

pub use error::{Result, StoreError};
pub use table::{DataTable, TableRow};
