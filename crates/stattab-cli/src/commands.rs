use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use tracing::{info, info_span};

use stattab_ingest::{LoadOptions, Separator, load_table};
use stattab_model::ValueFormat;
use stattab_report::render_table;
use stattab_store::DataTable;

use crate::cli::{InspectArgs, RenderArgs};

pub fn run_render(args: &RenderArgs) -> Result<()> {
    let separator = args.separator.to_separator()?;
    let table = load_from_path(&args.input, args.table_name.as_deref(), &separator)?;
    let html = render_table(&table).context("render table")?;
    match &args.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("create output file: {}", path.display()))?;
            file.write_all(html.as_bytes())
                .with_context(|| format!("write output file: {}", path.display()))?;
            info!(output = %path.display(), "wrote HTML fragment");
        }
        None => print!("{html}"),
    }
    Ok(())
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let separator = args.separator.to_separator()?;
    let table = load_from_path(&args.input, args.table_name.as_deref(), &separator)?;
    let rows = table.rows().context("query rows")?;

    println!("Table: {}", table.name());
    println!("Rows: {}", rows.len());
    let mut summary = Table::new();
    summary
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    summary.set_header(vec![
        "Column", "Type", "Min", "Max", "Scale", "Format", "Description",
    ]);
    for column in table.columns() {
        summary.add_row(vec![
            column.name.clone(),
            column.data_type.to_string(),
            column.value_min.to_string(),
            column.value_max.to_string(),
            column.scale.clone(),
            describe_format(column.format),
            column.description.clone(),
        ]);
    }
    println!("{summary}");
    Ok(())
}

fn load_from_path(input: &Path, table_name: Option<&str>, separator: &Separator) -> Result<DataTable> {
    let name = match table_name {
        Some(name) => name.to_string(),
        None => input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "table".to_string()),
    };
    let span = info_span!("load", input = %input.display(), table = %name);
    let _guard = span.enter();
    let file =
        File::open(input).with_context(|| format!("open input file: {}", input.display()))?;
    let table = load_table(
        &name,
        BufReader::new(file),
        separator,
        LoadOptions::default(),
    )
    .with_context(|| format!("load delimited file: {}", input.display()))?;
    Ok(table)
}

fn describe_format(format: ValueFormat) -> String {
    match format {
        ValueFormat::Fixed(decimals) => format!("fixed({decimals})"),
        ValueFormat::Raw => "raw".to_string(),
    }
}
