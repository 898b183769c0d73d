//! Typed access to a step's resolved parameters.

use std::path::PathBuf;

use haz_core::errors::{ErrorInfo, HazError};
use serde_json::{Map, Value};

/// The parameters a step runs with: declared defaults overlaid by the
/// step's configuration slice.
///
/// A `null` value counts as absent for the `opt_*` accessors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepArgs {
    step: String,
    values: Map<String, Value>,
}

impl StepArgs {
    /// Wraps resolved `values` for the step called `step`.
    pub fn new(step: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            step: step.into(),
            values,
        }
    }

    /// Name of the step these arguments belong to.
    pub fn step(&self) -> &str {
        &self.step
    }

    /// Every resolved value.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Raw value of `name`, `None` when absent or `null`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// Raw value of `name`, failing when absent.
    pub fn value(&self, name: &str) -> Result<&Value, HazError> {
        self.get(name).ok_or_else(|| {
            HazError::Configuration(
                ErrorInfo::new("step.missing_param", "parameter has no value")
                    .with_context("step", self.step.clone())
                    .with_context("param", name),
            )
        })
    }

    fn type_error(&self, name: &str, expected: &str, found: &Value) -> HazError {
        HazError::Configuration(
            ErrorInfo::new("step.param_type", format!("parameter should be {expected}"))
                .with_context("step", self.step.clone())
                .with_context("param", name)
                .with_context("value", found.to_string()),
        )
    }

    /// String parameter.
    pub fn str(&self, name: &str) -> Result<&str, HazError> {
        let value = self.value(name)?;
        value
            .as_str()
            .ok_or_else(|| self.type_error(name, "a string", value))
    }

    /// Optional string parameter.
    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, HazError> {
        self.get(name).map(|_| self.str(name)).transpose()
    }

    /// Numeric parameter.
    pub fn f64(&self, name: &str) -> Result<f64, HazError> {
        let value = self.value(name)?;
        value
            .as_f64()
            .ok_or_else(|| self.type_error(name, "a number", value))
    }

    /// Optional numeric parameter.
    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, HazError> {
        self.get(name).map(|_| self.f64(name)).transpose()
    }

    /// Boolean parameter.
    pub fn bool(&self, name: &str) -> Result<bool, HazError> {
        let value = self.value(name)?;
        value
            .as_bool()
            .ok_or_else(|| self.type_error(name, "true or false", value))
    }

    /// File path parameter.
    pub fn path(&self, name: &str) -> Result<PathBuf, HazError> {
        self.str(name).map(PathBuf::from)
    }

    /// A string or a list of strings, always returned as a list.
    pub fn str_list(&self, name: &str) -> Result<Vec<String>, HazError> {
        let value = self.value(name)?;
        match value {
            Value::String(single) => Ok(vec![single.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.type_error(name, "a list of strings", value))
                })
                .collect(),
            other => Err(self.type_error(name, "a string or a list of strings", other)),
        }
    }

    /// A list of numbers.
    pub fn f64_list(&self, name: &str) -> Result<Vec<f64>, HazError> {
        let value = self.value(name)?;
        value
            .as_array()
            .and_then(|items| items.iter().map(Value::as_f64).collect::<Option<Vec<f64>>>())
            .ok_or_else(|| self.type_error(name, "a list of numbers", value))
    }

    /// Optional list of numbers.
    pub fn opt_f64_list(&self, name: &str) -> Result<Option<Vec<f64>>, HazError> {
        self.get(name).map(|_| self.f64_list(name)).transpose()
    }

    /// A non-empty list of arbitrary values.
    pub fn list(&self, name: &str) -> Result<&[Value], HazError> {
        let value = self.value(name)?;
        value
            .as_array()
            .map(Vec::as_slice)
            .filter(|items| !items.is_empty())
            .ok_or_else(|| self.type_error(name, "a non-empty list", value))
    }

    /// A mapping of names to values.
    pub fn map(&self, name: &str) -> Result<&Map<String, Value>, HazError> {
        let value = self.value(name)?;
        value
            .as_object()
            .ok_or_else(|| self.type_error(name, "a mapping", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> StepArgs {
        match value {
            Value::Object(map) => StepArgs::new("demo", map),
            _ => unreachable!("test arguments are objects"),
        }
    }

    #[test]
    fn null_counts_as_absent() {
        let args = args(json!({"scale": null, "name": "x"}));
        assert_eq!(args.opt_f64("scale").unwrap(), None);
        assert_eq!(args.opt_str("name").unwrap(), Some("x"));
        assert_eq!(args.f64("scale").unwrap_err().code(), "step.missing_param");
    }

    #[test]
    fn string_lists_accept_a_single_string() {
        let args = args(json!({"one": "a", "many": ["a", "b"], "bad": [1]}));
        assert_eq!(args.str_list("one").unwrap(), vec!["a"]);
        assert_eq!(args.str_list("many").unwrap(), vec!["a", "b"]);
        let err = args.str_list("bad").unwrap_err();
        assert_eq!(err.code(), "step.param_type");
        assert_eq!(err.info().context["step"], "demo");
    }
}
