//! Delimited text codec for [`Table`]s.
//!
//! Decoding trims every header and value, then types each column: a column
//! whose non-empty values all parse as `f64` becomes [`Column::Float`] (empty
//! cells read as `NaN`), anything else stays [`Column::Text`].
//!
//! Encoding writes one row per entity. Vector columns are reduced to their
//! per-entity mean; tensor columns are rejected.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use haz_core::errors::{ErrorInfo, HazError};

use crate::column::Column;
use crate::table::Table;

fn csv_format_error(code: &str, path: &Path, err: csv::Error) -> HazError {
    let mut info = ErrorInfo::new(code, err.to_string()).with_path(path);
    if let Some(position) = err.position() {
        info = info.with_context("line", position.line().to_string());
    }
    HazError::Format(info)
}

/// Reads a comma separated file with a header row into a [`Table`].
pub fn decode(path: impl AsRef<Path>) -> Result<Table, HazError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| HazError::io("table.open", path, err))?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| csv_format_error("table.header", path, err))?
        .iter()
        .map(str::to_string)
        .collect();
    for (idx, name) in headers.iter().enumerate() {
        if headers[..idx].contains(name) {
            return Err(HazError::Format(
                ErrorInfo::new("table.duplicate_header", "column name appears twice")
                    .with_path(path)
                    .with_context("column", name.clone()),
            ));
        }
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|err| csv_format_error("table.record", path, err))?;
        for (cells, field) in raw.iter_mut().zip(record.iter()) {
            cells.push(field.to_string());
        }
    }

    Ok(headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| (name, infer_column(cells)))
        .collect())
}

fn infer_column(cells: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = cells
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                Some(f64::NAN)
            } else {
                cell.parse::<f64>().ok()
            }
        })
        .collect();
    match parsed {
        Some(values) => Column::Float(values),
        None => Column::Text(cells),
    }
}

/// Writes `table` to `path` as comma separated text with a header row.
///
/// Parent directories are created as needed.
pub fn encode(table: &Table, path: impl AsRef<Path>) -> Result<(), HazError> {
    let path = path.as_ref();
    let rows = table.row_count()?;
    let mut flat: Vec<(&str, Column)> = Vec::with_capacity(table.width());
    for (name, column) in table.iter() {
        match column {
            Column::Tensor { shape, .. } => {
                return Err(HazError::Format(
                    ErrorInfo::new(
                        "table.unsupported_shape",
                        "columns with more than two dimensions cannot be written as text",
                    )
                    .with_path(path)
                    .with_context("column", name)
                    .with_context("ndim", (shape.len() + 1).to_string())
                    .with_hint("reduce the column before persisting it"),
                ))
            }
            other => flat.push((name, other.squash())),
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| HazError::io("table.mkdir", parent, err))?;
        }
    }
    let file = File::create(path).map_err(|err| HazError::io("table.create", path, err))?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));
    writer
        .write_record(flat.iter().map(|(name, _)| *name))
        .map_err(|err| csv_format_error("table.write_header", path, err))?;
    for row in 0..rows {
        let record: Vec<String> = flat.iter().map(|(_, column)| cell(column, row)).collect();
        writer
            .write_record(&record)
            .map_err(|err| csv_format_error("table.write_row", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| HazError::io("table.flush", path, err))?;
    Ok(())
}

fn cell(column: &Column, row: usize) -> String {
    match column {
        Column::Float(values) => values[row].to_string(),
        Column::Text(values) => values[row].clone(),
        // squash() leaves only scalar columns behind
        Column::Vector { .. } | Column::Tensor { .. } => String::new(),
    }
}
