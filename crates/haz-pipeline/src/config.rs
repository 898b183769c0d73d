//! YAML run files.

use std::fs;
use std::path::Path;

use haz_core::errors::{ErrorInfo, HazError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pipeline::PipelineConfig;

/// Parameters holding file paths, resolved against the run file directory.
pub const PATH_PARAMS: &[&str] = &["file_name", "file_list"];

/// One entry of the `pipeline` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepEntry {
    /// Registered step name.
    pub name: String,
    /// Parameter values for the step.
    pub params: Map<String, Value>,
}

/// A parsed run file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    /// Master seed; each worker derives its own stream from it.
    pub seed: u64,
    /// Number of in-process workers.
    pub workers: usize,
    /// Steps in execution order.
    pub pipeline: Vec<StepEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRunConfig {
    #[serde(default)]
    seed: u64,
    #[serde(default = "RawRunConfig::default_workers")]
    workers: usize,
    #[serde(default)]
    pipeline: Vec<serde_yaml::Value>,
}

impl RawRunConfig {
    const fn default_workers() -> usize {
        1
    }
}

fn config_error(code: &str, message: &str, source: &str) -> ErrorInfo {
    ErrorInfo::new(code, message).with_context("path", source)
}

fn parse_entry(entry: serde_yaml::Value, index: usize, source: &str) -> Result<StepEntry, HazError> {
    let bad_entry = || {
        HazError::Configuration(
            config_error(
                "config.pipeline_entry",
                "pipeline entries must be a step name or a single-key mapping",
                source,
            )
            .with_context("index", index.to_string()),
        )
    };
    match entry {
        serde_yaml::Value::String(name) => Ok(StepEntry {
            name,
            params: Map::new(),
        }),
        serde_yaml::Value::Mapping(mapping) if mapping.len() == 1 => {
            let Some((key, value)) = mapping.into_iter().next() else {
                return Err(bad_entry());
            };
            let name = key.as_str().ok_or_else(bad_entry)?.to_string();
            let params = match serde_json::to_value(value) {
                Ok(Value::Object(params)) => params,
                Ok(Value::Null) => Map::new(),
                Ok(_) => {
                    return Err(HazError::Configuration(
                        config_error(
                            "config.step_params",
                            "step parameters must be a mapping",
                            source,
                        )
                        .with_context("step", name),
                    ))
                }
                Err(err) => {
                    return Err(HazError::Configuration(
                        config_error("config.step_params", &err.to_string(), source)
                            .with_context("step", name),
                    ))
                }
            };
            Ok(StepEntry { name, params })
        }
        _ => Err(bad_entry()),
    }
}

impl RunConfig {
    /// Parses run file text. `source` names the input in error context.
    pub fn from_yaml_str(text: &str, source: &str) -> Result<Self, HazError> {
        let raw: RawRunConfig = serde_yaml::from_str(text).map_err(|err| {
            HazError::Configuration(config_error("config.parse", &err.to_string(), source))
        })?;
        let pipeline = raw
            .pipeline
            .into_iter()
            .enumerate()
            .map(|(index, entry)| parse_entry(entry, index, source))
            .collect::<Result<Vec<_>, _>>()?;
        let config = Self {
            seed: raw.seed,
            workers: raw.workers,
            pipeline,
        };
        config.step_config()?;
        Ok(config)
    }

    /// Reads and parses the run file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HazError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| HazError::io("config.read", path, err))?;
        Self::from_yaml_str(&text, &path.display().to_string())
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<String> {
        self.pipeline.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Parameters keyed by step name.
    ///
    /// A step listed more than once must carry the same parameters each time.
    pub fn step_config(&self) -> Result<PipelineConfig, HazError> {
        let mut config = PipelineConfig::new();
        for entry in &self.pipeline {
            match config.get(&entry.name) {
                Some(existing) if *existing != entry.params => {
                    return Err(HazError::Configuration(
                        ErrorInfo::new(
                            "config.conflicting_step",
                            "a repeated step must repeat its parameters",
                        )
                        .with_context("step", entry.name.clone()),
                    ))
                }
                Some(_) => {}
                None => {
                    config.insert(entry.name.clone(), entry.params.clone());
                }
            }
        }
        Ok(config)
    }

    /// Rewrites relative paths in [`PATH_PARAMS`] to live under `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |value: &mut Value| {
            if let Value::String(text) = value {
                let path = Path::new(text.as_str());
                if path.is_relative() {
                    *text = base.join(path).display().to_string();
                }
            }
        };
        for entry in &mut self.pipeline {
            for key in PATH_PARAMS {
                match entry.params.get_mut(*key) {
                    Some(Value::Array(items)) => items.iter_mut().for_each(resolve),
                    Some(value) => resolve(value),
                    None => {}
                }
            }
        }
    }
}
