//! HTML rendering of a stats table.
//!
//! A two-pass, read-only transform: pass 1 turns the schema into header
//! cells carrying `data-chroma-*` attributes, pass 2 turns row data into
//! bar-and-value cells. The output is a self-contained fragment; the
//! embedding page supplies the `mqc_table` / `chroma-col` CSS and any JS
//! reacting to the data attributes.
//!
//! Normalization and formatting are display-layer concerns: a value that
//! refuses numeric coercion renders with an empty bar and its verbatim text,
//! never an error.

use std::collections::BTreeMap;
use std::fmt::Write;

use anyhow::{Context, Result};

use stattab_model::{CellValue, ValueFormat};
use stattab_store::DataTable;

/// Position of a value within a column's declared `[min, max]` range as a
/// 0-100 bar width. Total: a non-coercible value, a degenerate range
/// (`max == min`) or an unbounded range all collapse to `0`.
pub fn normalized_percentage(value: &CellValue, min: f64, max: f64) -> f64 {
    let Some(number) = value.as_f64() else {
        return 0.0;
    };
    let percentage = ((number - min) / (max - min)) * 100.0;
    if !percentage.is_finite() {
        return 0.0;
    }
    percentage.clamp(0.0, 100.0)
}

/// Apply a column format to a value, falling back to the verbatim text when
/// the value has no reading the format expects. Missing values render empty.
pub fn format_value(value: &CellValue, format: ValueFormat) -> String {
    format.apply(value).unwrap_or_else(|| value.to_string())
}

/// Render the table to a single `mqc_table` HTML fragment.
///
/// The first (identity) column supplies the row-header label and is never
/// scaled or formatted. Rendering reads the store's current contents and
/// holds no state between calls.
pub fn render_table(table: &DataTable) -> Result<String> {
    let columns = table.columns();
    let identity = table
        .identity_column()
        .context("cannot render a table with no columns")?;

    // Pass 1: header markup per non-identity column, in schema order.
    let mut header_cells: Vec<(String, String)> = Vec::new();
    for column in &columns[1..] {
        let mut cell = String::new();
        write!(
            cell,
            "<th id=\"header_{name}\" class=\"chroma-col {name}\" \
             data-chroma-scale=\"{scale}\" data-chroma-max=\"{max}\" \
             data-chroma-min=\"{min}\">\
             <span data-toggle=\"tooltip\" title=\"{descrip}\">{title}</span></th>",
            name = column.name,
            scale = column.scale,
            max = column.value_max,
            min = column.value_min,
            descrip = column.description,
            title = column.name,
        )?;
        header_cells.push((column.name.clone(), cell));
    }

    // Pass 2: cell markup per row, per non-identity column.
    let rows = table.rows().context("query rows for rendering")?;
    let mut row_cells: Vec<(String, BTreeMap<String, String>)> = Vec::new();
    for row in &rows {
        let mut cells = BTreeMap::new();
        for column in &columns[1..] {
            let Some(value) = row.get(&column.name) else {
                continue;
            };
            let percentage =
                normalized_percentage(value, column.value_min, column.value_max);
            let display = format_value(value, column.format);
            let mut cell = String::new();
            write!(
                cell,
                "<td class=\"data-coloured {name}\">\
                 <div class=\"wrapper\">\
                 <span class=\"bar\" style=\"width:{percentage}%;\"></span>\
                 <span class=\"val\">{display}</span>\
                 </div></td>",
                name = column.name,
            )?;
            cells.insert(column.name.clone(), cell);
        }
        row_cells.push((row.name.clone(), cells));
    }

    // Final assembly.
    let mut out = String::new();
    writeln!(out, "<div class=\"table-responsive\">")?;
    writeln!(
        out,
        "<table id=\"{}\" class=\"table table-condensed mqc_table\">",
        table.name()
    )?;
    writeln!(out, "<thead>")?;
    writeln!(out, "<tr>")?;
    writeln!(out, "<th class=\"rowheader\">{}</th>", identity.name)?;
    for (_, cell) in &header_cells {
        writeln!(out, "{cell}")?;
    }
    writeln!(out, "</tr>")?;
    writeln!(out, "</thead>")?;
    writeln!(out, "<tbody>")?;
    for (row_name, cells) in &row_cells {
        writeln!(out, "<tr>")?;
        writeln!(
            out,
            "<th class=\"rowheader\" data-original-sn=\"{row_name}\">{row_name}</th>"
        )?;
        for (column_name, _) in &header_cells {
            match cells.get(column_name) {
                Some(cell) => writeln!(out, "{cell}")?,
                // Tolerate a row with no entry at all for this column.
                None => writeln!(out, "<td class=\"{column_name}\"></td>")?,
            }
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</tbody>")?;
    writeln!(out, "</table>")?;
    writeln!(out, "</div>")?;
    Ok(out)
}
