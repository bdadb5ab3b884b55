/// Output rendering: bordered tables and raw document pass-through
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use super::error::ConversionError;
use super::rows::Row;

/// Write `rows` as a bordered table with a separator after every row.
///
/// Nothing is written when `rows` is empty.
pub fn write_table<W: Write>(out: &mut W, header: &[&str], rows: &[Row]) -> io::Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let titles: Vec<String> = header.iter().map(|h| h.to_uppercase()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| flatten(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = titles.iter().map(|t| t.width()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
    }

    let separator = separator_line(&widths);
    writeln!(out, "{}", separator)?;
    write_line(out, &titles, &widths)?;
    writeln!(out, "{}", separator)?;
    for row in &cells {
        write_line(out, row, &widths)?;
        writeln!(out, "{}", separator)?;
    }
    Ok(())
}

fn separator_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

fn write_line<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let mut line = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let padding = width.saturating_sub(cell.width());
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(padding + 1));
        line.push('|');
    }
    writeln!(out, "{}", line)
}

/// Cells are single-line
fn flatten(cell: &str) -> String {
    cell.replace(['\r', '\n'], " ")
}

/// Convert a raw JSON body into a YAML document
pub fn json_to_yaml(raw: &[u8]) -> Result<String, ConversionError> {
    let value: serde_json::Value = serde_json::from_slice(raw)?;
    Ok(serde_yaml::to_string(&value)?)
}

/// Write one YAML document of a multi-document stream
pub fn write_yaml_document<W: Write>(out: &mut W, yaml: &str) -> io::Result<()> {
    writeln!(out, "---")?;
    out.write_all(yaml.as_bytes())?;
    if !yaml.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Write a raw body unchanged, followed by a newline
pub fn write_raw<W: Write>(out: &mut W, raw: &[u8]) -> io::Result<()> {
    out.write_all(raw)?;
    writeln!(out)
}
