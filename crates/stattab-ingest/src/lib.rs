pub mod loader;

pub use loader::{IngestError, LoadOptions, Result, Separator, load_into, load_table};
