#![deny(missing_docs)]
#![doc = "Random sampling primitives used by pipeline steps."]

/// Grouped index permutations.
pub mod permute;
/// Discrete weighted sampling.
pub mod weighted;

pub use permute::{permutation, permutation_within_groups};
pub use weighted::{weighted_values, Categorical, PROBABILITY_TOLERANCE};
