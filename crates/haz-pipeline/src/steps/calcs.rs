//! Element-wise attribute arithmetic.

use haz_core::errors::{ErrorInfo, HazError};
use haz_table::Column;
use serde_json::Value;

use crate::args::StepArgs;
use crate::context::Context;
use crate::registry::StepEnv;

/// Sets `var` to `value` for every entity. Strings give a text attribute.
pub fn constant(
    context: &mut Context,
    args: &StepArgs,
    _env: &mut StepEnv<'_>,
) -> Result<(), HazError> {
    let var = args.str("var")?;
    let n = context.entity_count()?;
    let column = match args.value("value")? {
        Value::String(text) => Column::Text(vec![text.clone(); n]),
        _ => Column::filled(args.f64("value")?, n),
    };
    context.set_attribute(var, column);
    Ok(())
}

/// `var_out = var1 + var2`; text attributes are concatenated.
pub fn add(context: &mut Context, args: &StepArgs, _env: &mut StepEnv<'_>) -> Result<(), HazError> {
    binary(context, args, "add", |a, b| a + b, Some(|a: &str, b: &str| format!("{a}{b}")))
}

/// `var_out = var1 * var2`.
pub fn mult(context: &mut Context, args: &StepArgs, _env: &mut StepEnv<'_>) -> Result<(), HazError> {
    binary(context, args, "mult", |a, b| a * b, None::<fn(&str, &str) -> String>)
}

fn binary<N, T>(
    context: &mut Context,
    args: &StepArgs,
    op: &str,
    numeric: N,
    text: Option<T>,
) -> Result<(), HazError>
where
    N: Fn(f64, f64) -> f64,
    T: Fn(&str, &str) -> String,
{
    let lookup = |name: &str| {
        context.attribute(name).ok_or_else(|| {
            HazError::Configuration(
                ErrorInfo::new("calc.missing_attribute", "attribute not present in context")
                    .with_context("step", args.step())
                    .with_context("attribute", name),
            )
        })
    };
    let left = lookup(args.str("var1")?)?;
    let right = lookup(args.str("var2")?)?;
    if left.len() != right.len() {
        return Err(HazError::DataIntegrity(
            ErrorInfo::new("calc.length_mismatch", "operands differ in entity count")
                .with_context("step", args.step())
                .with_context("left", left.len().to_string())
                .with_context("right", right.len().to_string()),
        ));
    }
    let zip = |a: &[f64], b: &[f64]| -> Vec<f64> {
        a.iter().zip(b).map(|(x, y)| numeric(*x, *y)).collect()
    };
    let result = match (left, right, &text) {
        (Column::Float(a), Column::Float(b), _) => Column::Float(zip(&a[..], &b[..])),
        (Column::Vector { width, values: a }, Column::Vector { width: w, values: b }, _)
            if width == w =>
        {
            Column::Vector {
                width: *width,
                values: zip(&a[..], &b[..]),
            }
        }
        (Column::Text(a), Column::Text(b), Some(concat)) => {
            Column::Text(a.iter().zip(b).map(|(x, y)| concat(x, y)).collect())
        }
        (left, right, _) => {
            return Err(HazError::Configuration(
                ErrorInfo::new("calc.operand_kind", "operation not defined for these attribute kinds")
                    .with_context("step", args.step())
                    .with_context("op", op)
                    .with_context("left", left.kind())
                    .with_context("right", right.kind()),
            ))
        }
    };
    context.set_attribute(args.str("var_out")?, result);
    Ok(())
}
