//! JSON array bundle that keeps vector columns intact.

use std::fs;
use std::path::Path;

use haz_core::errors::{ErrorInfo, HazError};
use haz_core::provenance::SchemaVersion;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::table::Table;

#[derive(Debug, Serialize, Deserialize)]
struct BundleFile {
    schema_version: SchemaVersion,
    columns: IndexMap<String, BundleColumn>,
}

// JSON has no NaN, so missing numbers travel as null.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum BundleColumn {
    Float { values: Vec<Option<f64>> },
    Text { values: Vec<String> },
    Vector { width: usize, values: Vec<Option<f64>> },
    Tensor { shape: Vec<usize>, values: Vec<Option<f64>> },
}

fn to_nullable(values: &[f64]) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|v| if v.is_nan() { None } else { Some(*v) })
        .collect()
}

fn from_nullable(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

impl From<&Column> for BundleColumn {
    fn from(column: &Column) -> Self {
        match column {
            Column::Float(values) => BundleColumn::Float {
                values: to_nullable(values),
            },
            Column::Text(values) => BundleColumn::Text {
                values: values.clone(),
            },
            Column::Vector { width, values } => BundleColumn::Vector {
                width: *width,
                values: to_nullable(values),
            },
            Column::Tensor { shape, values } => BundleColumn::Tensor {
                shape: shape.clone(),
                values: to_nullable(values),
            },
        }
    }
}

impl From<BundleColumn> for Column {
    fn from(column: BundleColumn) -> Self {
        match column {
            BundleColumn::Float { values } => Column::Float(from_nullable(values)),
            BundleColumn::Text { values } => Column::Text(values),
            BundleColumn::Vector { width, values } => Column::Vector {
                width,
                values: from_nullable(values),
            },
            BundleColumn::Tensor { shape, values } => Column::Tensor {
                shape,
                values: from_nullable(values),
            },
        }
    }
}

/// Persists `table` as a JSON bundle, creating parent directories.
pub fn write_bundle(table: &Table, path: impl AsRef<Path>) -> Result<(), HazError> {
    let path = path.as_ref();
    table.row_count()?;
    let bundle = BundleFile {
        schema_version: SchemaVersion::default(),
        columns: table
            .iter()
            .map(|(name, column)| (name.to_string(), BundleColumn::from(column)))
            .collect(),
    };
    let bytes = serde_json::to_vec_pretty(&bundle).map_err(|err| {
        HazError::Format(ErrorInfo::new("bundle.encode", err.to_string()).with_path(path))
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| HazError::io("bundle.mkdir", parent, err))?;
        }
    }
    fs::write(path, bytes).map_err(|err| HazError::io("bundle.write", path, err))
}

/// Reads a bundle written by [`write_bundle`].
pub fn read_bundle(path: impl AsRef<Path>) -> Result<Table, HazError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| HazError::io("bundle.read", path, err))?;
    let bundle: BundleFile = serde_json::from_slice(&bytes).map_err(|err| {
        HazError::Format(ErrorInfo::new("bundle.decode", err.to_string()).with_path(path))
    })?;
    let table: Table = bundle
        .columns
        .into_iter()
        .map(|(name, column)| (name, Column::from(column)))
        .collect();
    table.row_count()?;
    Ok(table)
}
