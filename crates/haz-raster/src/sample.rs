use std::path::Path;

use haz_core::errors::HazError;
use tracing::debug;

use crate::grid::{check_coordinates, AsciiGrid};

/// Samples several rasters at the same points.
///
/// For each point the first raster, in the order given, that yields a value
/// other than `NaN` wins. Rasters are loaded one at a time and loading stops
/// once every point has a value.
pub fn sample_sources<P: AsRef<Path>>(
    paths: &[P],
    lon: &[f64],
    lat: &[f64],
) -> Result<Vec<f64>, HazError> {
    check_coordinates(lon, lat)?;
    let mut values = vec![f64::NAN; lon.len()];
    let mut unresolved = values.len();
    for path in paths {
        if unresolved == 0 {
            break;
        }
        let grid = AsciiGrid::load(path)?;
        for (idx, slot) in values.iter_mut().enumerate() {
            if slot.is_nan() {
                *slot = grid.sample(lon[idx], lat[idx]);
                if !slot.is_nan() {
                    unresolved -= 1;
                }
            }
        }
        debug!(
            path = %path.as_ref().display(),
            unresolved,
            "sampled raster source"
        );
    }
    Ok(values)
}
