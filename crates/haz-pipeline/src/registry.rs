//! Statically declared step catalogue.

use std::fmt;

use haz_core::errors::{ErrorInfo, HazError};
use haz_core::rng::RngHandle;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::args::StepArgs;
use crate::context::Context;
use crate::parallel::Coordinator;

/// Process-scoped services handed to every step.
pub struct StepEnv<'a> {
    /// Coordination with the other workers of the run.
    pub coordinator: &'a dyn Coordinator,
    /// This worker's random stream.
    pub rng: &'a mut RngHandle,
}

impl fmt::Debug for StepEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepEnv")
            .field("rank", &self.coordinator.rank())
            .field("size", &self.coordinator.size())
            .finish_non_exhaustive()
    }
}

/// Executable body of a step.
pub type StepFn = fn(&mut Context, &StepArgs, &mut StepEnv<'_>) -> Result<(), HazError>;

/// One declared parameter of a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    /// Parameter name as used in configuration.
    pub name: String,
    /// Value used when the configuration omits the parameter.
    pub default: Option<Value>,
}

impl ParamSpec {
    /// A parameter the configuration must supply.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// A parameter with a default value.
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// Broad category of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Moves data in or out of the context.
    Job,
    /// Derives attributes from other attributes.
    Calc,
}

/// A registered step: its name, parameters and body.
#[derive(Clone)]
pub struct StepDescriptor {
    name: String,
    kind: StepKind,
    params: Vec<ParamSpec>,
    required_params: Vec<String>,
    optional_params: Vec<String>,
    accepts_extra: bool,
    run: StepFn,
}

impl fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required_params", &self.required_params)
            .field("optional_params", &self.optional_params)
            .field("accepts_extra", &self.accepts_extra)
            .finish()
    }
}

impl StepDescriptor {
    /// Declares a step with its parameters in declaration order.
    ///
    /// The required/optional split is computed here, once. Declaring the same
    /// parameter twice is a configuration error.
    pub fn new(
        name: impl Into<String>,
        kind: StepKind,
        params: Vec<ParamSpec>,
        run: StepFn,
    ) -> Result<Self, HazError> {
        let name = name.into();
        for (idx, param) in params.iter().enumerate() {
            if params[..idx].iter().any(|p| p.name == param.name) {
                return Err(HazError::Configuration(
                    ErrorInfo::new("registry.duplicate_param", "parameter declared twice")
                        .with_context("step", name.clone())
                        .with_context("param", param.name.clone()),
                ));
            }
        }
        let (required, optional): (Vec<&ParamSpec>, Vec<&ParamSpec>) =
            params.iter().partition(|p| p.default.is_none());
        let required_params = required.into_iter().map(|p| p.name.clone()).collect();
        let optional_params = optional.into_iter().map(|p| p.name.clone()).collect();
        Ok(Self {
            name,
            kind,
            params,
            required_params,
            optional_params,
            accepts_extra: false,
            run,
        })
    }

    /// Lets the step receive configuration keys it does not declare.
    pub fn accepting_extra(mut self) -> Self {
        self.accepts_extra = true;
        self
    }

    /// External identifier of the step.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Job or calc.
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Every declared parameter in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Names of parameters without a default, in declaration order.
    pub fn required_params(&self) -> &[String] {
        &self.required_params
    }

    /// Names of parameters with a default, in declaration order.
    pub fn optional_params(&self) -> &[String] {
        &self.optional_params
    }

    /// Whether undeclared configuration keys are passed through.
    pub fn accepts_extra(&self) -> bool {
        self.accepts_extra
    }

    /// Declared parameter called `name`.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub(crate) fn invoke(
        &self,
        context: &mut Context,
        args: &StepArgs,
        env: &mut StepEnv<'_>,
    ) -> Result<(), HazError> {
        (self.run)(context, args, env)
    }
}

/// Steps indexed by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: IndexMap<String, StepDescriptor>,
}

impl StepRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in job and calc.
    pub fn builtin() -> Result<Self, HazError> {
        let mut registry = Self::new();
        crate::steps::register_builtin(&mut registry)?;
        Ok(registry)
    }

    /// Adds a step; a name that is already taken is a configuration error.
    pub fn register(&mut self, step: StepDescriptor) -> Result<(), HazError> {
        if self.steps.contains_key(step.name()) {
            return Err(HazError::Configuration(
                ErrorInfo::new("registry.duplicate_step", "step name registered twice")
                    .with_context("step", step.name()),
            ));
        }
        self.steps.insert(step.name.clone(), step);
        Ok(())
    }

    /// Looks up a step.
    pub fn get(&self, name: &str) -> Option<&StepDescriptor> {
        self.steps.get(name)
    }

    /// True when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Registered steps in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.values()
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
