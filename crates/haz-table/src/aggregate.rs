//! Group-by aggregation of entity tables.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use haz_core::errors::{ErrorInfo, HazError};
use serde::{Deserialize, Serialize};

use crate::column::{Column, GroupKey};
use crate::table::Table;

/// Reduction applied to the members of one group. Missing values are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agg {
    /// Arithmetic mean.
    Mean,
    /// Sum, `0` for an empty group.
    Sum,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Sample standard deviation (one delta degree of freedom).
    Std,
    /// Number of non-missing values.
    Count,
}

impl Agg {
    /// Suffix used in output column names.
    pub fn name(&self) -> &'static str {
        match self {
            Agg::Mean => "mean",
            Agg::Sum => "sum",
            Agg::Min => "min",
            Agg::Max => "max",
            Agg::Std => "std",
            Agg::Count => "count",
        }
    }

    fn apply(&self, values: &[f64]) -> f64 {
        let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = present.len() as f64;
        match self {
            Agg::Count => n,
            Agg::Sum => present.iter().sum(),
            Agg::Mean if present.is_empty() => f64::NAN,
            Agg::Mean => present.iter().sum::<f64>() / n,
            Agg::Min => present.iter().copied().reduce(f64::min).unwrap_or(f64::NAN),
            Agg::Max => present.iter().copied().reduce(f64::max).unwrap_or(f64::NAN),
            Agg::Std if present.len() < 2 => f64::NAN,
            Agg::Std => {
                let mean = present.iter().sum::<f64>() / n;
                let ss: f64 = present.iter().map(|v| (v - mean).powi(2)).sum();
                (ss / (n - 1.0)).sqrt()
            }
        }
    }
}

impl fmt::Display for Agg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Agg {
    type Err = HazError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Agg::Mean),
            "sum" => Ok(Agg::Sum),
            "min" => Ok(Agg::Min),
            "max" => Ok(Agg::Max),
            "std" => Ok(Agg::Std),
            "count" => Ok(Agg::Count),
            other => Err(HazError::Configuration(
                ErrorInfo::new("aggregate.unknown_function", "unknown aggregation function")
                    .with_context("function", other)
                    .with_hint("use one of mean, sum, min, max, std, count"),
            )),
        }
    }
}

/// Aggregations requested for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggSpec {
    /// Column to reduce.
    pub column: String,
    /// Reductions, each producing `<column>_<agg>`.
    pub aggs: Vec<Agg>,
}

/// Groups the entities of `table` by `groupby` and reduces each requested column.
///
/// The output holds the distinct group keys (sorted, in the key column's own
/// type) followed by one column per `(column, agg)` pair. Vector columns are
/// reduced to their per-entity mean first.
pub fn aggregate(table: &Table, groupby: &str, specs: &[AggSpec]) -> Result<Table, HazError> {
    table.row_count()?;
    let key_column = table.get(groupby).ok_or_else(|| missing_column(groupby))?;
    let keys = key_column.group_keys().ok_or_else(|| {
        HazError::Configuration(
            ErrorInfo::new("aggregate.groupby_shape", "group-by column must hold scalars")
                .with_context("column", groupby)
                .with_context("kind", key_column.kind()),
        )
    })?;

    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for (idx, key) in keys.into_iter().enumerate() {
        groups.entry(key).or_default().push(idx);
    }

    let mut out = Table::new();
    let group_keys: Vec<&GroupKey> = groups.keys().collect();
    let key_out = match key_column {
        Column::Text(_) => Column::Text(
            group_keys
                .iter()
                .map(|key| match key {
                    GroupKey::Text(text) => text.clone(),
                    GroupKey::Number(value) => value.to_string(),
                })
                .collect(),
        ),
        _ => Column::Float(
            group_keys
                .iter()
                .map(|key| match key {
                    GroupKey::Number(value) => *value,
                    GroupKey::Text(_) => f64::NAN,
                })
                .collect(),
        ),
    };
    out.insert(groupby, key_out);

    for spec in specs {
        let column = table
            .get(&spec.column)
            .ok_or_else(|| missing_column(&spec.column))?
            .squash();
        let values = column.as_floats().ok_or_else(|| {
            HazError::Configuration(
                ErrorInfo::new("aggregate.non_numeric", "only numeric columns can be aggregated")
                    .with_context("column", spec.column.clone()),
            )
        })?;
        for agg in &spec.aggs {
            let reduced = groups
                .values()
                .map(|members| {
                    let picked: Vec<f64> = members.iter().map(|&i| values[i]).collect();
                    agg.apply(&picked)
                })
                .collect();
            out.insert(format!("{}_{}", spec.column, agg), Column::Float(reduced));
        }
    }
    Ok(out)
}

fn missing_column(name: &str) -> HazError {
    HazError::Configuration(
        ErrorInfo::new("aggregate.missing_column", "column not present in table")
            .with_context("column", name),
    )
}
