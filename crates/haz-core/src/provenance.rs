//! Provenance written alongside persisted result sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, HazError};

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Schema of this summary.
    pub schema_version: SchemaVersion,
    /// Hash of the run configuration.
    pub input_hash: String,
    /// Master seed used for all randomness.
    pub seed: u64,
    /// Number of workers the run was split across.
    pub workers: usize,
    /// Ordered step names executed by every worker.
    pub steps: Vec<String>,
    /// Distinct entities across the run, counted by global entity id.
    ///
    /// Workers that hold the same entity (a load without partitioning)
    /// count it once.
    pub entities: Option<usize>,
    /// Entities each worker held at the end of the run, in rank order.
    #[serde(default)]
    pub worker_entities: Vec<usize>,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}

/// Computes a stable hexadecimal SHA-256 of the JSON form of `value`.
///
/// Stability relies on `value` serializing maps with a deterministic key order
/// (`BTreeMap`, `serde_json::Map` without `preserve_order`).
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, HazError> {
    let bytes = serde_json::to_vec(value).map_err(|err| {
        HazError::Format(ErrorInfo::new("provenance.hash_encode", err.to_string()))
    })?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
