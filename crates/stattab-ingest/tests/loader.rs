//! Loader round-trip and integrity tests.

use std::io::Cursor;

use stattab_ingest::{IngestError, LoadOptions, Separator, load_into, load_table};
use stattab_model::{CellValue, ColumnSchema, ColumnType};
use stattab_store::DataTable;

#[test]
fn header_round_trip() {
    let source = "ID,score,flag\ns1,3.14,ok\n";
    let table = load_table(
        "stats",
        Cursor::new(source),
        &Separator::default_pattern(),
        LoadOptions::default(),
    )
    .unwrap();

    let names: Vec<&str> = table
        .columns()
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(names, vec!["ID", "score", "flag"]);

    let rows = table.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "s1");
    assert_eq!(rows[0].get("score"), Some(&CellValue::Text("3.14".to_string())));
    assert_eq!(rows[0].get("flag"), Some(&CellValue::Text("ok".to_string())));
}

#[test]
fn header_fields_are_trimmed_of_quotes() {
    let source = "\"ID\",\"score\"\n\"s1\",\"7\"\n";
    let table = load_table(
        "stats",
        Cursor::new(source),
        &Separator::Literal(",".to_string()),
        LoadOptions::default(),
    )
    .unwrap();

    assert_eq!(table.columns()[1].name, "score");
    let rows = table.rows().unwrap();
    assert_eq!(rows[0].name, "s1");
    assert_eq!(rows[0].get("score"), Some(&CellValue::Text("7".to_string())));
}

#[test]
fn field_count_mismatch_aborts_with_line_number() {
    let source = "ID,score,flag\ns1,3.14\n";
    let err = load_table(
        "stats",
        Cursor::new(source),
        &Separator::default_pattern(),
        LoadOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        IngestError::FieldCount {
            line: 2,
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn blank_lines_are_skipped() {
    let source = "ID,score\n\ns1,1\n   \ns2,2\n";
    let table = load_table(
        "stats",
        Cursor::new(source),
        &Separator::default_pattern(),
        LoadOptions::default(),
    )
    .unwrap();
    assert_eq!(table.rows().unwrap().len(), 2);
}

#[test]
fn unparsed_header_requires_load_into() {
    let err = load_table(
        "stats",
        Cursor::new("s1,1\n"),
        &Separator::default_pattern(),
        LoadOptions {
            header: false,
            parse_header: false,
        },
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::HeaderRequired));
}

#[test]
fn load_into_uses_the_registered_schema() {
    let mut table = DataTable::new("stats").unwrap();
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

    let inserted = load_into(
        &mut table,
        Cursor::new("s1\t4.5\ns2\t9.1\n"),
        &Separator::Literal("\t".to_string()),
        LoadOptions {
            header: false,
            parse_header: false,
        },
    )
    .unwrap();
    assert_eq!(inserted, 2);

    let rows = table.rows().unwrap();
    assert_eq!(rows[0].name, "s1");
    // REAL column affinity: the numeric text comes back as a number.
    assert_eq!(rows[1].get("score"), Some(&CellValue::Number(9.1)));
}

#[test]
fn load_into_skips_an_unparsed_header_line() {
    let mut table = DataTable::new("stats").unwrap();
    table
        .add_column(ColumnSchema::new("Sample", ColumnType::Text))
        .unwrap();
    table
        .add_column(ColumnSchema::new("score", ColumnType::Real))
        .unwrap();

    let inserted = load_into(
        &mut table,
        Cursor::new("ignored header\ns1,3\n"),
        &Separator::Literal(",".to_string()),
        LoadOptions {
            header: true,
            parse_header: false,
        },
    )
    .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(table.rows().unwrap()[0].name, "s1");
}

#[test]
fn empty_source_yields_identity_only_table() {
    let table = load_table(
        "stats",
        Cursor::new(""),
        &Separator::default_pattern(),
        LoadOptions::default(),
    )
    .unwrap();
    assert_eq!(table.columns().len(), 1);
    assert!(table.rows().unwrap().is_empty());
}
