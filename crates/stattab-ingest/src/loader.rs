//! Delimited-text loader.
//!
//! Parses line-oriented text into a schema plus rows and feeds the row store.
//! The first field of every line is the row name; the first header field
//! names the identity column. The loader only writes, it never renders.

use std::collections::BTreeMap;
use std::io::BufRead;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, info_span};

use stattab_model::{CellValue, ColumnSchema, ColumnType};
use stattab_store::{DataTable, StoreError};

/// Characters stripped from both ends of every header and data field.
const FIELD_TRIM: &[char] = &[' ', '"', '\'', '\t', '\r', '\n'];

/// Identity-column name used when the header's first field is blank.
const DEFAULT_IDENTITY: &str = "Sample";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("line {line}: expected {expected} data fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("a parsed header is required to derive the schema; use load_into for headerless input")]
    HeaderRequired,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Field separator: a regex pattern or a literal split token.
#[derive(Debug, Clone)]
pub enum Separator {
    Pattern(Regex),
    Literal(String),
}

impl Separator {
    /// The stock separator: any single tab, space or comma.
    pub fn default_pattern() -> Self {
        Separator::Pattern(Regex::new(r"[\t ,]").expect("static separator pattern"))
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Separator::Pattern(regex) => regex.split(line).collect(),
            Separator::Literal(token) => line.split(token.as_str()).collect(),
        }
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self::default_pattern()
    }
}

/// Flags for the leading line of the source.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// The first line is a header rather than data.
    pub header: bool,
    /// Derive column schemas from the header fields.
    pub parse_header: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            header: true,
            parse_header: true,
        }
    }
}

/// Build a fully populated table from delimited text, deriving the schema
/// from the header line. Header fields become `Text` columns with default
/// format and scale; the first field names the identity column.
pub fn load_table<R: BufRead>(
    table_name: &str,
    reader: R,
    separator: &Separator,
    options: LoadOptions,
) -> Result<DataTable> {
    if !(options.header && options.parse_header) {
        return Err(IngestError::HeaderRequired);
    }
    let span = info_span!("load_table", table = %table_name);
    let _guard = span.enter();

    let mut lines = reader.lines();
    let mut table = DataTable::new(table_name)?;
    let Some(header) = lines.next().transpose()? else {
        // Empty source: an identity-only table with no rows.
        table.add_column(ColumnSchema::new(DEFAULT_IDENTITY, ColumnType::Text))?;
        table.initialize()?;
        return Ok(table);
    };

    let fields = separator.split(&header);
    let identity = trim_field(fields.first().copied().unwrap_or(""));
    let identity = if identity.is_empty() {
        DEFAULT_IDENTITY
    } else {
        identity
    };
    table.add_column(ColumnSchema::new(identity, ColumnType::Text))?;
    for field in &fields[1..] {
        let name = trim_field(field);
        table.add_column(ColumnSchema::new(name, ColumnType::Text))?;
    }
    debug!(columns = table.columns().len(), "parsed header");
    table.initialize()?;

    let inserted = read_rows(&table, lines, separator, 2)?;
    info!(
        rows = inserted,
        columns = table.columns().len(),
        "loaded delimited source"
    );
    Ok(table)
}

/// Load data lines into a table whose columns are already registered. Used
/// for headerless sources or when the header should not drive the schema
/// (it is skipped when `options.header` is set).
pub fn load_into<R: BufRead>(
    table: &mut DataTable,
    reader: R,
    separator: &Separator,
    options: LoadOptions,
) -> Result<usize> {
    let span = info_span!("load_into", table = %table.name());
    let _guard = span.enter();

    if !table.is_initialized() {
        table.initialize()?;
    }
    let mut lines = reader.lines();
    let mut first_data_line = 1;
    if options.header {
        lines.next().transpose()?;
        first_data_line = 2;
    }
    let inserted = read_rows(table, lines, separator, first_data_line)?;
    info!(rows = inserted, "loaded delimited source");
    Ok(inserted)
}

fn read_rows<I>(
    table: &DataTable,
    lines: I,
    separator: &Separator,
    first_line_number: usize,
) -> Result<usize>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    // Data fields zip against everything after the identity column.
    let data_columns: Vec<String> = table
        .columns()
        .iter()
        .skip(1)
        .map(|column| column.name.clone())
        .collect();
    let mut inserted = 0usize;
    for (offset, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_number = first_line_number + offset;
        let fields = separator.split(&line);
        let row_name = trim_field(fields.first().copied().unwrap_or(""));
        let data_fields = &fields[1..];
        if data_fields.len() != data_columns.len() {
            return Err(IngestError::FieldCount {
                line: line_number,
                expected: data_columns.len(),
                found: data_fields.len(),
            });
        }
        let mut row_data = BTreeMap::new();
        for (column, field) in data_columns.iter().zip(data_fields) {
            row_data.insert(
                column.clone(),
                CellValue::Text(trim_field(field).to_string()),
            );
        }
        table.add_row(row_name, &row_data)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn trim_field(field: &str) -> &str {
    field.trim_matches(FIELD_TRIM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_strips_quotes_and_whitespace() {
        assert_eq!(trim_field("  \"score\"\r\n"), "score");
        assert_eq!(trim_field("'flag'"), "flag");
        assert_eq!(trim_field("plain"), "plain");
    }

    #[test]
    fn literal_separator_splits_verbatim() {
        let separator = Separator::Literal("::".to_string());
        assert_eq!(separator.split("a::b::c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn default_pattern_splits_on_tab_space_comma() {
        let separator = Separator::default_pattern();
        assert_eq!(separator.split("a\tb c,d"), vec!["a", "b", "c", "d"]);
    }
}
