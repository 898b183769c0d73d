//! Steps that consume the worker's random stream.

use haz_core::errors::{ErrorInfo, HazError};
use haz_sampling::{permutation, permutation_within_groups, Categorical};
use haz_table::Column;
use serde_json::Value;
use tracing::debug;

use crate::args::StepArgs;
use crate::context::{Context, INTID};
use crate::registry::StepEnv;

/// Draws one value per entity from `values` weighted by `probabilities`
/// into `var_out`.
///
/// `forced_draws`, when given, replaces the random stream. It holds one
/// uniform draw per entity of the whole run, indexed by [`INTID`], so the
/// result does not depend on how entities are split across workers. A list
/// matching only the local entity count is used as is.
pub fn weighted_category(
    context: &mut Context,
    args: &StepArgs,
    env: &mut StepEnv<'_>,
) -> Result<(), HazError> {
    let values = args.list("values")?;
    let probabilities = args.f64_list("probabilities")?;
    let n = context.entity_count()?;
    let forced = args
        .opt_f64_list("forced_draws")?
        .map(|draws| draws_for_entities(context, draws));

    let distribution = Categorical::new(values, &probabilities)?;
    let drawn = distribution.draw(&[n], forced.as_deref(), &mut *env.rng)?;
    let column = if drawn.iter().all(Value::is_number) {
        Column::Float(drawn.iter().filter_map(Value::as_f64).collect())
    } else if drawn.iter().all(Value::is_string) {
        Column::Text(drawn.iter().filter_map(Value::as_str).map(str::to_string).collect())
    } else {
        return Err(HazError::Configuration(
            ErrorInfo::new("weighted_category.mixed_values", "values must be all numbers or all strings")
                .with_context("step", args.step()),
        ));
    };
    context.set_attribute(args.str("var_out")?, column);
    Ok(())
}

/// Picks each entity's draw by its global id when every id indexes `draws`.
fn draws_for_entities(context: &Context, draws: Vec<f64>) -> Vec<f64> {
    let Some(ids) = context.attribute(INTID).and_then(Column::as_floats) else {
        return draws;
    };
    let picked: Option<Vec<f64>> = ids
        .iter()
        .map(|&id| {
            let valid = id >= 0.0 && id.fract() == 0.0 && id < draws.len() as f64;
            valid.then(|| draws[id as usize])
        })
        .collect();
    match picked {
        Some(picked) => {
            debug!(global = draws.len(), local = picked.len(), "forced draws selected by entity id");
            picked
        }
        None => draws,
    }
}

/// Shuffles the values of one or more attributes across entities.
///
/// With `groupby`, values only move between entities sharing that
/// attribute's value. Each field gets its own permutation.
pub fn permutate_exposure(
    context: &mut Context,
    args: &StepArgs,
    env: &mut StepEnv<'_>,
) -> Result<(), HazError> {
    let fields = args.str_list("field")?;
    let keys = match args.opt_str("groupby")? {
        Some(groupby) => {
            let column = context.attribute(groupby).ok_or_else(|| {
                HazError::Configuration(
                    ErrorInfo::new("permutate.missing_groupby", "group-by attribute not present in context")
                        .with_context("step", args.step())
                        .with_context("groupby", groupby),
                )
            })?;
            let keys = column.group_keys().ok_or_else(|| {
                HazError::Configuration(
                    ErrorInfo::new("permutate.groupby_shape", "group-by attribute must hold scalars")
                        .with_context("step", args.step())
                        .with_context("groupby", groupby),
                )
            })?;
            Some(keys)
        }
        None => None,
    };

    let n = context.entity_count()?;
    for field in &fields {
        let column = context.attribute(field).ok_or_else(|| {
            HazError::Configuration(
                ErrorInfo::new("permutate.missing_field", "attribute not present in context")
                    .with_context("step", args.step())
                    .with_context("field", field.clone()),
            )
        })?;
        let perm = match &keys {
            Some(keys) => permutation_within_groups(keys, &mut *env.rng),
            None => permutation(n, &mut *env.rng),
        };
        let shuffled = column.take(&perm);
        debug!(field = %field, grouped = keys.is_some(), "permuted attribute");
        context.set_attribute(field.clone(), shuffled);
    }
    Ok(())
}
