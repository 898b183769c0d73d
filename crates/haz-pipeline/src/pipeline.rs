//! Ordered step execution against one context.

use std::collections::BTreeMap;

use haz_core::errors::{ErrorInfo, HazError};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::args::StepArgs;
use crate::context::Context;
use crate::registry::{StepDescriptor, StepEnv, StepRegistry};

/// Per-step configuration: step name to parameter values.
pub type PipelineConfig = BTreeMap<String, Map<String, Value>>;

/// Resolves step names against a registry.
#[derive(Debug, Clone, Copy)]
pub struct PipelineBuilder<'r> {
    registry: &'r StepRegistry,
}

impl<'r> PipelineBuilder<'r> {
    /// Creates a builder over `registry`.
    pub fn new(registry: &'r StepRegistry) -> Self {
        Self { registry }
    }

    /// Resolves every name up front; any unknown name fails the build.
    pub fn build<S: AsRef<str>>(&self, names: &[S]) -> Result<Pipeline, HazError> {
        let steps = names
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let name = name.as_ref();
                self.registry.get(name).cloned().ok_or_else(|| {
                    HazError::Configuration(
                        ErrorInfo::new("pipeline.unknown_step", "step is not registered")
                            .with_context("step", name)
                            .with_context("position", position.to_string())
                            .with_hint("`hazimp steps` lists the registered steps"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pipeline { steps })
    }
}

/// An executable, ordered list of steps.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<StepDescriptor>,
}

impl Pipeline {
    /// The steps in execution order.
    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name().to_string()).collect()
    }

    /// Runs every step in order against `context`.
    ///
    /// Each step receives its slice of `config` merged over its declared
    /// defaults. The entity count invariant is checked after every step; the
    /// first failure stops the run and carries the step name.
    pub fn run(
        &self,
        context: &mut Context,
        config: &PipelineConfig,
        env: &mut StepEnv<'_>,
    ) -> Result<(), HazError> {
        for key in config.keys() {
            if !self.steps.iter().any(|step| step.name() == key) {
                warn!(step = %key, "configuration for a step outside the pipeline is ignored");
            }
        }
        info!(steps = self.steps.len(), rank = env.coordinator.rank(), "pipeline started");

        let empty = Map::new();
        for (position, step) in self.steps.iter().enumerate() {
            let slice = config.get(step.name()).unwrap_or(&empty);
            let tag = |err: HazError| {
                err.with_context("step", step.name())
                    .with_context("position", position.to_string())
            };
            let args = resolve_args(step, slice, context).map_err(tag)?;
            info!(step = step.name(), position, "running step");
            debug!(step = step.name(), params = ?args.values(), "resolved parameters");
            step.invoke(context, &args, env).map_err(tag)?;
            context.check_integrity().map_err(tag)?;
        }

        info!(entities = context.check_integrity()?, "pipeline finished");
        Ok(())
    }
}

/// Merges `slice` over the step's declared defaults.
///
/// A required parameter missing from `slice` is still satisfied when the
/// context holds an attribute of that name.
pub fn resolve_args(
    step: &StepDescriptor,
    slice: &Map<String, Value>,
    context: &Context,
) -> Result<StepArgs, HazError> {
    if !step.accepts_extra() {
        if let Some(unknown) = slice.keys().find(|key| step.param(key).is_none()) {
            return Err(HazError::Configuration(
                ErrorInfo::new("pipeline.unknown_param", "step does not declare this parameter")
                    .with_context("step", step.name())
                    .with_context("param", unknown.clone())
                    .with_hint(format!(
                        "declared parameters: {}",
                        step.params()
                            .iter()
                            .map(|p| p.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
            ));
        }
    }
    if let Some(missing) = step
        .required_params()
        .iter()
        .find(|name| !slice.contains_key(name.as_str()) && !context.has_attribute(name))
    {
        return Err(HazError::Configuration(
            ErrorInfo::new("pipeline.missing_param", "required parameter not configured")
                .with_context("step", step.name())
                .with_context("param", missing.clone()),
        ));
    }

    let mut values = Map::new();
    for param in step.params() {
        if let Some(default) = &param.default {
            values.insert(param.name.clone(), default.clone());
        }
    }
    for (key, value) in slice {
        values.insert(key.clone(), value.clone());
    }
    Ok(StepArgs::new(step.name(), values))
}
