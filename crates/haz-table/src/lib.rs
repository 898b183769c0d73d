#![deny(missing_docs)]
#![doc = "Named-column entity tables, their delimited text codec and a JSON array bundle."]

/// Group-by aggregation.
pub mod aggregate;
/// JSON bundle persistence.
pub mod bundle;
/// Delimited text encode/decode.
pub mod codec;
/// Per-entity column storage.
pub mod column;
/// Insertion-ordered tables.
pub mod table;

pub use aggregate::{aggregate, Agg, AggSpec};
pub use bundle::{read_bundle, write_bundle};
pub use codec::{decode, encode};
pub use column::{Column, GroupKey};
pub use table::Table;
