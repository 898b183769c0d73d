#![deny(missing_docs)]
#![doc = "Core error, seeding and provenance types for the hazard impact engine."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, HazError};
pub use provenance::{stable_hash_string, RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
