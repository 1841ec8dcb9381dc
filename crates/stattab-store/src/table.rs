//! The row store: an ordered column arena in front of a private in-memory
//! SQLite table.
//!
//! The relational backing keeps schema evolution (column addition after data
//! exists) and bulk insertion uniform: a post-init column is an `ALTER TABLE`,
//! and rows inserted before it read back `NULL`, which surfaces as the
//! table's missing-value sentinel. Row retrieval is a single `SELECT` in
//! `rowid` order rather than iteration logic scattered through callers.

use std::collections::BTreeMap;

use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, ErrorCode, params_from_iter};

use stattab_model::{CellValue, ColumnSchema, SchemaError};

use crate::error::{Result, StoreError};

/// One row as read back from the store: the row name plus a value for every
/// column known to the schema at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub name: String,
    pub cells: BTreeMap<String, CellValue>,
}

impl TableRow {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

/// A named, schema-driven table of sample rows.
///
/// Columns are kept in registration order; the first registered column is the
/// row-name/identity column and is the table's primary key. The backing
/// database is private to this instance and released when it is dropped.
#[derive(Debug)]
pub struct DataTable {
    name: String,
    columns: Vec<ColumnSchema>,
    missing_value: CellValue,
    initialized: bool,
    conn: Connection,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            columns: Vec::new(),
            missing_value: CellValue::Missing,
            initialized: false,
            conn: Connection::open_in_memory()?,
        })
    }

    /// Override the sentinel stored for columns a row never received.
    #[must_use]
    pub fn with_missing_value(mut self, sentinel: CellValue) -> Self {
        self.missing_value = sentinel;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// All registered columns in registration order, identity column first.
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// The row-name column, when any column has been registered.
    pub fn identity_column(&self) -> Option<&ColumnSchema> {
        self.columns.first()
    }

    /// Register a new column. Once the table is initialized the physical
    /// column is added immediately; existing rows read back the sentinel for
    /// it (lazy backfill via SQL `NULL`), never a re-derived value.
    pub fn add_column(&mut self, schema: ColumnSchema) -> Result<()> {
        if self.column(&schema.name).is_some() {
            return Err(SchemaError::DuplicateColumn(schema.name).into());
        }
        if self.initialized {
            let sql = format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                quote_ident(&self.name),
                quote_ident(&schema.name),
                schema.data_type.as_sql()
            );
            self.conn.execute(&sql, [])?;
        }
        self.columns.push(schema);
        Ok(())
    }

    /// Materialize the backing table with all registered columns. One-way:
    /// a second call is an error.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(StoreError::AlreadyInitialized);
        }
        let Some(identity) = self.columns.first() else {
            return Err(SchemaError::NoColumns.into());
        };
        let mut defs = vec![format!(
            "{} {} PRIMARY KEY",
            quote_ident(&identity.name),
            identity.data_type.as_sql()
        )];
        for column in &self.columns[1..] {
            defs.push(format!(
                "{} {}",
                quote_ident(&column.name),
                column.data_type.as_sql()
            ));
        }
        let sql = format!(
            "CREATE TABLE {} ({})",
            quote_ident(&self.name),
            defs.join(", ")
        );
        self.conn.execute(&sql, [])?;
        self.initialized = true;
        Ok(())
    }

    /// Insert one row. `row_data` need not cover every column; absent columns
    /// receive the sentinel. The identity column is supplied through
    /// `row_name` and must not appear in `row_data`. A duplicate row name is
    /// rejected and the original row is left untouched (first write wins).
    pub fn add_row(&self, row_name: &str, row_data: &BTreeMap<String, CellValue>) -> Result<()> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }
        for key in row_data.keys() {
            if self.column(key).is_none() {
                return Err(SchemaError::UnknownColumn(key.clone()).into());
            }
            if self
                .identity_column()
                .is_some_and(|identity| identity.name == *key)
            {
                return Err(StoreError::IdentityInRowData(key.clone()));
            }
        }
        let mut values = Vec::with_capacity(self.columns.len());
        values.push(Value::Text(row_name.to_string()));
        for column in &self.columns[1..] {
            let cell = row_data.get(&column.name).unwrap_or(&self.missing_value);
            values.push(to_sql_value(cell));
        }
        let sql = self.insert_sql();
        self.conn
            .execute(&sql, params_from_iter(values))
            .map_err(|err| map_insert_error(err, row_name))?;
        Ok(())
    }

    /// Bulk insert. Each inner vector is positionally ordered to match the
    /// current column order, row name first. Short rows are padded with the
    /// sentinel in their non-identity columns only; a row with no first value
    /// gets the empty row name, so a second such row collides. Over-long rows
    /// are rejected. There is no rollback: rows preceding a failure stay
    /// committed.
    pub fn add_many_rows<I>(&self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }
        let sql = self.insert_sql();
        let mut stmt = self.conn.prepare(&sql)?;
        for row in rows {
            if row.len() > self.columns.len() {
                return Err(StoreError::TooManyValues {
                    expected: self.columns.len(),
                    found: row.len(),
                });
            }
            // The identity slot always binds as text so the primary key
            // applies even to unnamed rows; SQLite would otherwise admit
            // NULL primary keys and treat each NULL as distinct.
            let row_name = row.first().map(ToString::to_string).unwrap_or_default();
            let mut values = Vec::with_capacity(self.columns.len());
            values.push(Value::Text(row_name.clone()));
            for cell in row.iter().skip(1) {
                values.push(to_sql_value(cell));
            }
            while values.len() < self.columns.len() {
                values.push(to_sql_value(&self.missing_value));
            }
            stmt.execute(params_from_iter(values))
                .map_err(|err| map_insert_error(err, &row_name))?;
        }
        Ok(())
    }

    /// Read all rows in insertion order. Each call re-queries the store, so
    /// rows added since a previous call are included; every row carries an
    /// entry for every column known to the schema at this point.
    pub fn rows(&self) -> Result<Vec<TableRow>> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }
        let column_list = self
            .columns
            .iter()
            .map(|column| quote_ident(&column.name))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            column_list,
            quote_ident(&self.name)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut sql_rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(sql_row) = sql_rows.next()? {
            let name_cell = from_sql_value(sql_row.get_ref(0)?, &self.missing_value);
            let mut cells = BTreeMap::new();
            for (index, column) in self.columns.iter().enumerate().skip(1) {
                let cell = from_sql_value(sql_row.get_ref(index)?, &self.missing_value);
                cells.insert(column.name.clone(), cell);
            }
            out.push(TableRow {
                name: name_cell.to_string(),
                cells,
            });
        }
        Ok(out)
    }

    /// Update a single cell in place.
    pub fn set_value(&self, row_name: &str, column_name: &str, value: CellValue) -> Result<()> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }
        if self.column(column_name).is_none() {
            return Err(SchemaError::UnknownColumn(column_name.to_string()).into());
        }
        let identity = self
            .identity_column()
            .ok_or(StoreError::from(SchemaError::NoColumns))?;
        let sql = format!(
            "UPDATE {} SET {} = ?1 WHERE {} = ?2",
            quote_ident(&self.name),
            quote_ident(column_name),
            quote_ident(&identity.name)
        );
        let changed = self.conn.execute(
            &sql,
            params_from_iter([to_sql_value(&value), Value::Text(row_name.to_string())]),
        )?;
        if changed == 0 {
            return Err(StoreError::RowNotFound(row_name.to_string()));
        }
        Ok(())
    }

    fn insert_sql(&self) -> String {
        let column_list = self
            .columns
            .iter()
            .map(|column| quote_ident(&column.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.name),
            column_list,
            placeholders
        )
    }
}

/// Quote an arbitrary identifier for SQLite. Column names come from untrusted
/// delimited headers, so everything goes through here.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Number(n) => Value::Real(*n),
        CellValue::Text(s) => Value::Text(s.clone()),
        CellValue::Missing => Value::Null,
    }
}

fn from_sql_value(value: ValueRef<'_>, sentinel: &CellValue) -> CellValue {
    match value {
        ValueRef::Null => sentinel.clone(),
        ValueRef::Integer(i) => CellValue::Number(i as f64),
        ValueRef::Real(r) => CellValue::Number(r),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn map_insert_error(err: rusqlite::Error, row_name: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::DuplicateRow(row_name.to_string())
        }
        _ => StoreError::Sqlite(err),
    }
}

#[cfg(test)]
mod tests {
    use stattab_model::ColumnType;

    use super::*;

    fn sample_table() -> DataTable {
        let mut table = DataTable::new("general_stats").expect("open store");
        table
            .add_column(ColumnSchema::new("Sample", ColumnType::Text))
            .unwrap();
        table
            .add_column(
                ColumnSchema::new("score", ColumnType::Real)
                    .with_min(0.0)
                    .with_max(10.0),
            )
            .unwrap();
        table.initialize().unwrap();
        table
    }

    #[test]
    fn initialize_requires_a_column() {
        let mut table = DataTable::new("empty").unwrap();
        assert!(matches!(
            table.initialize(),
            Err(StoreError::Schema(SchemaError::NoColumns))
        ));
    }

    #[test]
    fn initialize_twice_is_an_error() {
        let mut table = sample_table();
        assert!(matches!(
            table.initialize(),
            Err(StoreError::AlreadyInitialized)
        ));
    }

    #[test]
    fn insert_before_initialize_is_an_error() {
        let mut table = DataTable::new("t").unwrap();
        table
            .add_column(ColumnSchema::new("Sample", ColumnType::Text))
            .unwrap();
        let err = table.add_row("s1", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotInitialized));
    }

    #[test]
    fn duplicate_column_is_rejected() {
        let mut table = sample_table();
        let err = table
            .add_column(ColumnSchema::new("score", ColumnType::Real))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Schema(SchemaError::DuplicateColumn(name)) if name == "score"
        ));
    }

    #[test]
    fn quoting_escapes_embedded_quotes() {
        assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
    }
}
