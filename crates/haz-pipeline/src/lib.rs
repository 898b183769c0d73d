#![deny(missing_docs)]
#![doc = "Pipeline execution engine: step registry, ordered executor, analysis context and leader-based worker coordination."]

/// Typed step parameters.
pub mod args;
/// YAML run files.
pub mod config;
/// Shared analysis state.
pub mod context;
/// Worker coordination.
pub mod parallel;
/// Ordered execution.
pub mod pipeline;
/// Step declarations.
pub mod registry;
/// Built-in jobs and calcs.
pub mod steps;

pub use args::StepArgs;
pub use config::{RunConfig, StepEntry};
pub use context::{Context, EX_LAT, EX_LONG, INTID};
pub use parallel::{partition_range, ChannelCoordinator, Coordinator, LocalCluster, SingleProcess};
pub use pipeline::{resolve_args, Pipeline, PipelineBuilder, PipelineConfig};
pub use registry::{ParamSpec, StepDescriptor, StepEnv, StepFn, StepKind, StepRegistry};
