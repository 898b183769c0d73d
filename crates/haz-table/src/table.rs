//! Insertion-ordered named-column tables.

use indexmap::IndexMap;

use haz_core::errors::{ErrorInfo, HazError};

use crate::column::Column;

/// Mapping from column name to per-entity values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Column>,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a column, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Option<Column> {
        self.columns.insert(name.into(), column)
    }

    /// Removes a column while keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Column> {
        self.columns.shift_remove(name)
    }

    /// Looks up a column by name.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Looks up a column by name for in-place edits.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Returns true when a column of that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterates `(name, column)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Entity count shared by every column, `0` for a table without columns.
    ///
    /// Fails when two columns disagree, naming the first offending column.
    pub fn row_count(&self) -> Result<usize, HazError> {
        let mut iter = self.columns.iter();
        let Some((first_name, first)) = iter.next() else {
            return Ok(0);
        };
        let expected = first
            .checked_len()
            .map_err(|err| err.with_context("column", first_name.clone()))?;
        for (name, column) in iter {
            let found = column
                .checked_len()
                .map_err(|err| err.with_context("column", name.clone()))?;
            if found != expected {
                return Err(HazError::DataIntegrity(
                    ErrorInfo::new("table.length_mismatch", "columns differ in entity count")
                        .with_context("reference_column", first_name.clone())
                        .with_context("expected", expected.to_string())
                        .with_context("column", name.clone())
                        .with_context("found", found.to_string()),
                ));
            }
        }
        Ok(expected)
    }

    /// Selects entities by index from every column.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.take(indices)))
                .collect(),
        }
    }

    /// Keeps the contiguous entity range `start..end` of every column.
    pub fn slice(&self, start: usize, end: usize) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.slice(start, end)))
                .collect(),
        }
    }

    /// Concatenates tables row-wise over the union of their column names.
    ///
    /// Column order follows first appearance. Entities of a table lacking a
    /// column receive missing values (`NaN` or the empty string).
    pub fn concat(tables: Vec<Table>) -> Result<Table, HazError> {
        let mut lengths = Vec::with_capacity(tables.len());
        let mut templates: IndexMap<String, Column> = IndexMap::new();
        for table in &tables {
            lengths.push(table.row_count()?);
            for (name, column) in &table.columns {
                templates
                    .entry(name.clone())
                    .or_insert_with(|| column.missing_like(0));
            }
        }

        let mut out = Table::new();
        for (name, template) in templates {
            let mut merged = template.missing_like(0);
            for (table, len) in tables.iter().zip(&lengths) {
                let part = match table.get(&name) {
                    Some(column) => column.clone(),
                    None => template.missing_like(*len),
                };
                merged.append(part).map_err(|err| {
                    HazError::DataIntegrity(err.info().clone().with_context("column", name.clone()))
                })?;
            }
            out.insert(name, merged);
        }
        Ok(out)
    }
}

impl FromIterator<(String, Column)> for Table {
    fn from_iter<I: IntoIterator<Item = (String, Column)>>(iter: I) -> Self {
        Table {
            columns: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Table {
    type Item = (String, Column);
    type IntoIter = indexmap::map::IntoIter<String, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_count_detects_mismatch() {
        let mut table = Table::new();
        table.insert("a", Column::Float(vec![1.0, 2.0]));
        table.insert("b", Column::Float(vec![1.0]));
        let err = table.row_count().unwrap_err();
        assert_eq!(err.code(), "table.length_mismatch");
        assert_eq!(err.info().context.get("column").map(String::as_str), Some("b"));
    }

    #[test]
    fn row_count_rejects_partial_vector_blocks() {
        let mut table = Table::new();
        table.insert("a", Column::Float(vec![1.0, 2.0]));
        table.insert(
            "v",
            Column::Vector {
                width: 2,
                values: vec![1.0, 2.0, 3.0, 4.0, 5.0],
            },
        );
        let err = table.row_count().unwrap_err();
        assert_eq!(err.code(), "table.partial_block");
        assert_eq!(err.info().context["column"], "v");

        let mut zero_width = Table::new();
        zero_width.insert(
            "z",
            Column::Vector {
                width: 0,
                values: vec![],
            },
        );
        assert_eq!(zero_width.row_count().unwrap_err().code(), "table.partial_block");
    }

    #[test]
    fn concat_fills_missing_columns() {
        let mut first = Table::new();
        first.insert("a", Column::Float(vec![1.0]));
        let mut second = Table::new();
        second.insert("a", Column::Float(vec![2.0, 3.0]));
        second.insert("name", Column::Text(vec!["x".into(), "y".into()]));

        let merged = Table::concat(vec![first, second]).unwrap();
        assert_eq!(merged.row_count().unwrap(), 3);
        assert_eq!(merged.get("a"), Some(&Column::Float(vec![1.0, 2.0, 3.0])));
        assert_eq!(
            merged.get("name"),
            Some(&Column::Text(vec!["".into(), "x".into(), "y".into()]))
        );
    }
}
