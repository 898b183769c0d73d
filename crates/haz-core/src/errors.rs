//! Structured error types shared across the hazard impact crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`HazError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (step names, paths, offending values).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records the file a failure relates to under the `path` key.
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the hazard impact engine.
///
/// None of the families are retried anywhere; every failure propagates to the
/// caller of `run`, `load`, `draw`, `decode` or `encode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum HazError {
    /// Unknown step, missing or unexpected parameter, duplicate registration.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// Malformed raster or table input, unsupported column shape.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// Invalid probability distribution or draw shape.
    #[error("distribution error: {0}")]
    Distribution(ErrorInfo),
    /// Attribute arrays that disagree on the entity count.
    #[error("data integrity error: {0}")]
    DataIntegrity(ErrorInfo),
    /// File-system failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl HazError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            HazError::Configuration(info)
            | HazError::Format(info)
            | HazError::Distribution(info)
            | HazError::DataIntegrity(info)
            | HazError::Io(info) => info,
        }
    }

    /// Returns the stable code of the underlying payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry unless the key is already present.
    ///
    /// Used by outer layers (pipeline steps, workers) to tag errors raised
    /// deeper down without overwriting the more specific detail.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let info = match &mut self {
            HazError::Configuration(info)
            | HazError::Format(info)
            | HazError::Distribution(info)
            | HazError::DataIntegrity(info)
            | HazError::Io(info) => info,
        };
        info.context.entry(key.into()).or_insert_with(|| value.into());
        self
    }

    /// Wraps an I/O failure on `path` into an [`HazError::Io`].
    pub fn io(code: &str, path: &Path, err: impl ToString) -> Self {
        HazError::Io(ErrorInfo::new(code, err.to_string()).with_path(path))
    }
}
