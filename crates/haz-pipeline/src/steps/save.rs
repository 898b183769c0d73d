//! Jobs that persist results from the leader.

use std::str::FromStr;

use haz_core::errors::{ErrorInfo, HazError};
use haz_table::{aggregate, encode, Agg, AggSpec};
use tracing::info;

use crate::args::StepArgs;
use crate::context::Context;
use crate::registry::StepEnv;

/// Writes every entity to `file_name`; see [`Context::save_exposure_atts`].
pub fn save_exposure(
    context: &mut Context,
    args: &StepArgs,
    env: &mut StepEnv<'_>,
) -> Result<(), HazError> {
    let path = args.path("file_name")?;
    context.save_exposure_atts(&path, env.coordinator, args.bool("use_parallel")?)?;
    Ok(())
}

fn agg_specs(args: &StepArgs) -> Result<Vec<AggSpec>, HazError> {
    let mapping = args.map("aggregations")?;
    mapping
        .iter()
        .map(|(column, functions)| {
            let names: Vec<&str> = match functions {
                serde_json::Value::String(single) => vec![single.as_str()],
                serde_json::Value::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
                _ => Vec::new(),
            };
            let expected = functions.as_array().map_or(1, Vec::len);
            if names.is_empty() || names.len() != expected {
                return Err(HazError::Configuration(
                    ErrorInfo::new("save_aggregation.functions", "aggregation functions must be names")
                        .with_context("step", args.step())
                        .with_context("column", column.clone())
                        .with_context("value", functions.to_string()),
                ));
            }
            let aggs = names
                .into_iter()
                .map(Agg::from_str)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| err.with_context("step", args.step()))?;
            Ok(AggSpec {
                column: column.clone(),
                aggs,
            })
        })
        .collect()
}

/// Gathers every entity, groups by `groupby` and writes the reduced table
/// to `file_name` from the leader.
///
/// `aggregations` maps attribute names to a function name or a list of
/// them (`mean`, `sum`, `min`, `max`, `std`, `count`).
pub fn save_aggregation(
    context: &mut Context,
    args: &StepArgs,
    env: &mut StepEnv<'_>,
) -> Result<(), HazError> {
    let path = args.path("file_name")?;
    let groupby = args.str("groupby")?;
    let specs = agg_specs(args)?;
    let Some(table) = context.gather(env.coordinator, true)? else {
        return Ok(());
    };
    if !env.coordinator.is_leader() {
        return Ok(());
    }
    let reduced = aggregate(&table, groupby, &specs)?;
    encode(&reduced, &path)?;
    info!(path = %path.display(), groups = reduced.row_count()?, "saved aggregation");
    Ok(())
}
