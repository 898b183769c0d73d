//! Built-in jobs and calcs.

use haz_core::errors::HazError;
use serde_json::Value;

use crate::registry::{ParamSpec, StepDescriptor, StepKind, StepRegistry};

pub mod calcs;
pub mod draw;
pub mod load;
pub mod save;

/// Name of the CSV exposure loader.
pub const LOAD_CSV_EXPOSURE: &str = "load_csv_exposure";
/// Name of the raster sampling job.
pub const LOAD_RASTER: &str = "load_raster";
/// Name of the constant calc.
pub const CONSTANT: &str = "constant";
/// Name of the addition calc.
pub const ADD: &str = "add";
/// Name of the multiplication calc.
pub const MULT: &str = "mult";
/// Name of the weighted categorical draw.
pub const WEIGHTED_CATEGORY: &str = "weighted_category";
/// Name of the attribute permutation job.
pub const PERMUTATE_EXPOSURE: &str = "permutate_exposure";
/// Name of the exposure writer.
pub const SAVE_EXPOSURE: &str = "save_exposure";
/// Name of the aggregated writer.
pub const SAVE_AGGREGATION: &str = "save_aggregation";

/// Registers every built-in step into `registry`.
pub fn register_builtin(registry: &mut StepRegistry) -> Result<(), HazError> {
    use ParamSpec as P;

    let steps = [
        StepDescriptor::new(
            LOAD_CSV_EXPOSURE,
            StepKind::Job,
            vec![
                P::required("file_name"),
                P::optional("exposure_latitude", crate::context::EX_LAT),
                P::optional("exposure_longitude", crate::context::EX_LONG),
                P::optional("use_parallel", true),
            ],
            load::load_csv_exposure,
        )?,
        StepDescriptor::new(
            LOAD_RASTER,
            StepKind::Job,
            vec![
                P::required("file_list"),
                P::required("attribute_label"),
                P::optional("scaling_factor", Value::Null),
            ],
            load::load_raster,
        )?,
        StepDescriptor::new(
            CONSTANT,
            StepKind::Calc,
            vec![P::required("var"), P::required("value")],
            calcs::constant,
        )?,
        StepDescriptor::new(
            ADD,
            StepKind::Calc,
            vec![P::required("var1"), P::required("var2"), P::required("var_out")],
            calcs::add,
        )?,
        StepDescriptor::new(
            MULT,
            StepKind::Calc,
            vec![P::required("var1"), P::required("var2"), P::required("var_out")],
            calcs::mult,
        )?,
        StepDescriptor::new(
            WEIGHTED_CATEGORY,
            StepKind::Calc,
            vec![
                P::required("values"),
                P::required("probabilities"),
                P::required("var_out"),
                P::optional("forced_draws", Value::Null),
            ],
            draw::weighted_category,
        )?,
        StepDescriptor::new(
            PERMUTATE_EXPOSURE,
            StepKind::Job,
            vec![P::required("field"), P::optional("groupby", Value::Null)],
            draw::permutate_exposure,
        )?,
        StepDescriptor::new(
            SAVE_EXPOSURE,
            StepKind::Job,
            vec![P::required("file_name"), P::optional("use_parallel", true)],
            save::save_exposure,
        )?,
        StepDescriptor::new(
            SAVE_AGGREGATION,
            StepKind::Job,
            vec![
                P::required("file_name"),
                P::required("groupby"),
                P::required("aggregations"),
            ],
            save::save_aggregation,
        )?,
    ];
    for step in steps {
        registry.register(step)?;
    }
    Ok(())
}
