//! Draws from a discrete distribution given explicit probabilities.

use haz_core::errors::{ErrorInfo, HazError};
use rand::Rng;

/// Absolute tolerance on the probability sum before renormalisation.
pub const PROBABILITY_TOLERANCE: f64 = 0.01;

fn distribution_error(code: &str, message: &str) -> HazError {
    HazError::Distribution(ErrorInfo::new(code, message))
}

/// A validated categorical distribution over `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical<T> {
    values: Vec<T>,
    bins: Vec<f64>,
}

impl<T: Clone> Categorical<T> {
    /// Validates `probabilities` against `values` and builds the cumulative bins.
    ///
    /// The probabilities must be non-negative, match `values` in length and sum
    /// to one within [`PROBABILITY_TOLERANCE`]; they are renormalised so the
    /// last bin edge is one.
    pub fn new(values: &[T], probabilities: &[f64]) -> Result<Self, HazError> {
        if values.len() != probabilities.len() {
            return Err(HazError::Distribution(
                ErrorInfo::new(
                    "sampling.shape_mismatch",
                    "values and probabilities differ in length",
                )
                .with_context("values", values.len().to_string())
                .with_context("probabilities", probabilities.len().to_string()),
            ));
        }
        if values.is_empty() {
            return Err(distribution_error(
                "sampling.empty",
                "at least one value is required",
            ));
        }
        if let Some(bad) = probabilities.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
            return Err(HazError::Distribution(
                ErrorInfo::new("sampling.invalid_probability", "probabilities must be finite and non-negative")
                    .with_context("probability", bad.to_string()),
            ));
        }
        let total: f64 = probabilities.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(HazError::Distribution(
                ErrorInfo::new("sampling.sum", "probabilities should sum to 1.0")
                    .with_context("sum", total.to_string())
                    .with_hint(format!("allowed deviation is {PROBABILITY_TOLERANCE}")),
            ));
        }

        let mut running = 0.0;
        let bins = probabilities
            .iter()
            .map(|p| {
                running += p / total.abs();
                running
            })
            .collect();
        Ok(Self {
            values: values.to_vec(),
            bins,
        })
    }

    /// Cumulative bin edges of the normalised probabilities.
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Index of the value selected by uniform draw `u`.
    ///
    /// That is the number of bin edges less than or equal to `u`, clamped to
    /// the last value when rounding leaves the final edge just below `u`.
    pub fn index_of(&self, u: f64) -> usize {
        self.bins
            .partition_point(|edge| *edge <= u)
            .min(self.values.len() - 1)
    }

    /// Value selected by uniform draw `u`.
    pub fn pick(&self, u: f64) -> T {
        self.values[self.index_of(u)].clone()
    }

    /// Draws `size` values, from `forced` when given, from `rng` otherwise.
    ///
    /// `size` describes the output shape and must be one-dimensional; `forced`
    /// must hold exactly `size[0]` draws in `[0, 1)`.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        size: &[usize],
        forced: Option<&[f64]>,
        rng: &mut R,
    ) -> Result<Vec<T>, HazError> {
        let n = match size {
            [n] => *n,
            _ => {
                return Err(HazError::Distribution(
                    ErrorInfo::new("sampling.output_shape", "only one-dimensional draws are supported")
                        .with_context("ndim", size.len().to_string()),
                ))
            }
        };
        match forced {
            Some(draws) if draws.len() != n => Err(HazError::Distribution(
                ErrorInfo::new("sampling.forced_shape", "forced draws do not match the output size")
                    .with_context("size", n.to_string())
                    .with_context("forced", draws.len().to_string()),
            )),
            Some(draws) => Ok(draws.iter().map(|u| self.pick(*u)).collect()),
            None => Ok((0..n).map(|_| self.pick(rng.gen::<f64>())).collect()),
        }
    }
}

/// Draws `size` values from `values` weighted by `probabilities`.
///
/// Shorthand for [`Categorical::new`] followed by [`Categorical::draw`].
pub fn weighted_values<T: Clone, R: Rng + ?Sized>(
    values: &[T],
    probabilities: &[f64],
    size: &[usize],
    forced: Option<&[f64]>,
    rng: &mut R,
) -> Result<Vec<T>, HazError> {
    Categorical::new(values, probabilities)?.draw(size, forced, rng)
}
