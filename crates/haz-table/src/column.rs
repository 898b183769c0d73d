//! Per-entity column storage.

use std::cmp::Ordering;

use haz_core::errors::{ErrorInfo, HazError};

/// One attribute holding a value per entity.
///
/// `Vector` stores a fixed-width vector per entity, row-major. `Tensor` stores
/// per-entity values of two or more dimensions; it exists so that encoders can
/// reject it explicitly rather than guess a reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Scalar numeric values, `NaN` for missing.
    Float(Vec<f64>),
    /// Scalar textual values.
    Text(Vec<String>),
    /// `width` numeric values per entity.
    Vector {
        /// Number of values per entity.
        width: usize,
        /// Row-major values, `len * width` long.
        values: Vec<f64>,
    },
    /// Per-entity values of shape `shape` (at least two dimensions).
    Tensor {
        /// Shape of one entity's block.
        shape: Vec<usize>,
        /// Row-major values, `len * shape.product()` long.
        values: Vec<f64>,
    },
}

impl Column {
    /// Builds a vector column from one row per entity; every row must share a width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, HazError> {
        let width = rows.first().map(Vec::len).unwrap_or(1);
        if width == 0 {
            return Err(HazError::Format(ErrorInfo::new(
                "table.vector_width",
                "vector columns need at least one value per entity",
            )));
        }
        let mut values = Vec::with_capacity(rows.len() * width);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(HazError::DataIntegrity(
                    ErrorInfo::new("table.ragged_rows", "vector rows differ in width")
                        .with_context("row", idx.to_string())
                        .with_context("expected", width.to_string())
                        .with_context("found", row.len().to_string()),
                ));
            }
            values.extend(row);
        }
        Ok(Column::Vector { width, values })
    }

    /// Builds a column of `len` copies of `value`.
    pub fn filled(value: f64, len: usize) -> Self {
        Column::Float(vec![value; len])
    }

    /// Number of entities in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(values) => values.len(),
            Column::Text(values) => values.len(),
            Column::Vector { width, values } => values.len() / (*width).max(1),
            Column::Tensor { shape, values } => values.len() / block_size(shape),
        }
    }

    /// Entity count, failing when a vector or tensor column's values do not
    /// split into whole per-entity blocks.
    pub fn checked_len(&self) -> Result<usize, HazError> {
        let (block, values) = match self {
            Column::Float(values) => return Ok(values.len()),
            Column::Text(values) => return Ok(values.len()),
            Column::Vector { width, values } => (*width, values),
            Column::Tensor { shape, values } => (shape.iter().product::<usize>(), values),
        };
        if block == 0 || values.len() % block != 0 {
            return Err(HazError::DataIntegrity(
                ErrorInfo::new("table.partial_block", "values do not split into whole per-entity blocks")
                    .with_context("kind", self.kind())
                    .with_context("block", block.to_string())
                    .with_context("values", values.len().to_string()),
            ));
        }
        Ok(values.len() / block)
    }

    /// Returns true when the column holds no entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of the whole column, entity axis included.
    pub fn ndim(&self) -> usize {
        match self {
            Column::Float(_) | Column::Text(_) => 1,
            Column::Vector { .. } => 2,
            Column::Tensor { shape, .. } => 1 + shape.len(),
        }
    }

    /// Short name of the storage kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Text(_) => "text",
            Column::Vector { .. } => "vector",
            Column::Tensor { .. } => "tensor",
        }
    }

    /// Numeric scalar values, if the column holds them.
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Column::Float(values) => Some(values),
            _ => None,
        }
    }

    /// Textual values, if the column holds them.
    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Column::Text(values) => Some(values),
            _ => None,
        }
    }

    /// Reduces multi-dimensional columns to one value per entity by arithmetic mean.
    pub fn squash(&self) -> Column {
        match self {
            Column::Vector { width, values } => Column::Float(row_means(values, *width)),
            Column::Tensor { shape, values } => Column::Float(row_means(values, block_size(shape))),
            other => other.clone(),
        }
    }

    /// Selects entities by index, in the order given.
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Float(values) => Column::Float(indices.iter().map(|&i| values[i]).collect()),
            Column::Text(values) => {
                Column::Text(indices.iter().map(|&i| values[i].clone()).collect())
            }
            Column::Vector { width, values } => Column::Vector {
                width: *width,
                values: take_blocks(values, *width, indices),
            },
            Column::Tensor { shape, values } => Column::Tensor {
                shape: shape.clone(),
                values: take_blocks(values, block_size(shape), indices),
            },
        }
    }

    /// Keeps the contiguous entity range `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Column {
        let indices: Vec<usize> = (start..end).collect();
        self.take(&indices)
    }

    /// A column of the same kind holding `len` missing entries.
    pub fn missing_like(&self, len: usize) -> Column {
        match self {
            Column::Float(_) => Column::Float(vec![f64::NAN; len]),
            Column::Text(_) => Column::Text(vec![String::new(); len]),
            Column::Vector { width, .. } => Column::Vector {
                width: *width,
                values: vec![f64::NAN; len * width],
            },
            Column::Tensor { shape, .. } => Column::Tensor {
                shape: shape.clone(),
                values: vec![f64::NAN; len * block_size(shape)],
            },
        }
    }

    /// Appends the entities of `other`; both columns must share kind and shape.
    pub fn append(&mut self, other: Column) -> Result<(), HazError> {
        let mismatch = |left: &Column, right: &Column| {
            HazError::DataIntegrity(
                ErrorInfo::new("table.append_kind", "cannot append columns of different shape")
                    .with_context("left", left.kind())
                    .with_context("right", right.kind()),
            )
        };
        match (&mut *self, other) {
            (Column::Float(left), Column::Float(right)) => left.extend(right),
            (Column::Text(left), Column::Text(right)) => left.extend(right),
            (Column::Vector { width, values }, Column::Vector { width: w, values: right })
                if *width == w =>
            {
                values.extend(right)
            }
            (Column::Tensor { shape, values }, Column::Tensor { shape: s, values: right })
                if *shape == s =>
            {
                values.extend(right)
            }
            (left, right) => return Err(mismatch(&*left, &right)),
        }
        Ok(())
    }

    /// Grouping key of every entity; only scalar columns can group.
    pub fn group_keys(&self) -> Option<Vec<GroupKey>> {
        match self {
            Column::Float(values) => Some(values.iter().map(|v| GroupKey::Number(*v)).collect()),
            Column::Text(values) => Some(values.iter().cloned().map(GroupKey::Text).collect()),
            _ => None,
        }
    }
}

/// Value an entity is grouped by; numbers order before text, numbers by `total_cmp`.
#[derive(Debug, Clone)]
pub enum GroupKey {
    /// Numeric key.
    Number(f64),
    /// Textual key.
    Text(String),
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Number(a), GroupKey::Number(b)) => a.total_cmp(b),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            (GroupKey::Number(_), GroupKey::Text(_)) => Ordering::Less,
            (GroupKey::Text(_), GroupKey::Number(_)) => Ordering::Greater,
        }
    }
}

fn block_size(shape: &[usize]) -> usize {
    shape.iter().product::<usize>().max(1)
}

fn row_means(values: &[f64], width: usize) -> Vec<f64> {
    values
        .chunks(width.max(1))
        .map(|row| row.iter().sum::<f64>() / row.len() as f64)
        .collect()
}

fn take_blocks(values: &[f64], block: usize, indices: &[usize]) -> Vec<f64> {
    let mut out = Vec::with_capacity(indices.len() * block);
    for &i in indices {
        out.extend_from_slice(&values[i * block..(i + 1) * block]);
    }
    out
}
