//! Jobs that bring entities and hazard values into the context.

use haz_core::errors::{ErrorInfo, HazError};
use haz_raster::sample_sources;
use haz_table::{decode, Column, Table};
use tracing::info;

use crate::args::StepArgs;
use crate::context::{Context, INTID};
use crate::parallel::partition_range;
use crate::registry::StepEnv;

fn take_coordinate(table: &mut Table, column: &str, args: &StepArgs) -> Result<Vec<f64>, HazError> {
    match table.remove(column) {
        Some(Column::Float(values)) => Ok(values),
        Some(other) => Err(HazError::Format(
            ErrorInfo::new("load.coordinate_type", "coordinate column must be numeric")
                .with_context("step", args.step())
                .with_context("column", column)
                .with_context("kind", other.kind()),
        )),
        None => Err(HazError::Configuration(
            ErrorInfo::new("load.missing_coordinate", "coordinate column not found in exposure file")
                .with_context("step", args.step())
                .with_context("column", column)
                .with_hint("set exposure_latitude / exposure_longitude to the file's column names"),
        )),
    }
}

/// Reads an exposure CSV into the context, replacing its attributes.
///
/// The coordinate columns become the context coordinates, every entity gets
/// its global [`INTID`], and with `use_parallel` each worker keeps only its
/// contiguous share of the entities.
pub fn load_csv_exposure(
    context: &mut Context,
    args: &StepArgs,
    env: &mut StepEnv<'_>,
) -> Result<(), HazError> {
    let path = args.path("file_name")?;
    let mut table = decode(&path)?;
    let latitude = take_coordinate(&mut table, args.str("exposure_latitude")?, args)?;
    let longitude = take_coordinate(&mut table, args.str("exposure_longitude")?, args)?;
    let total = latitude.len();
    table.insert(INTID, Column::Float((0..total).map(|i| i as f64).collect()));
    table.row_count()?;

    let range = if args.bool("use_parallel")? {
        partition_range(total, env.coordinator.rank(), env.coordinator.size())
    } else {
        0..total
    };
    let local = table.slice(range.start, range.end);
    context.replace_attributes(local);
    context.set_coordinates(
        latitude[range.clone()].to_vec(),
        longitude[range.clone()].to_vec(),
    )?;
    info!(
        path = %path.display(),
        total,
        local = range.len(),
        rank = env.coordinator.rank(),
        "loaded exposure"
    );
    Ok(())
}

/// Samples one or more rasters at the entity coordinates into
/// `attribute_label`, optionally multiplied by `scaling_factor`.
pub fn load_raster(
    context: &mut Context,
    args: &StepArgs,
    _env: &mut StepEnv<'_>,
) -> Result<(), HazError> {
    if !context.has_coordinates() {
        return Err(HazError::Configuration(
            ErrorInfo::new("load_raster.no_coordinates", "entities must be loaded before sampling rasters")
                .with_context("step", args.step()),
        ));
    }
    let files = args.str_list("file_list")?;
    let label = args.str("attribute_label")?;
    let mut values = sample_sources(&files, context.longitude(), context.latitude())?;
    if let Some(factor) = args.opt_f64("scaling_factor")? {
        values.iter_mut().for_each(|v| *v *= factor);
    }
    let missing = values.iter().filter(|v| v.is_nan()).count();
    info!(attribute = label, sources = files.len(), missing, "sampled rasters");
    context.set_attribute(label, Column::Float(values));
    Ok(())
}
