use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use haz_core::{stable_hash_string, HazError, RngHandle, RunProvenance};
use haz_pipeline::{
    Context, Coordinator, LocalCluster, PipelineBuilder, RunConfig, StepEnv, StepRegistry, INTID,
};
use haz_table::Column;
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML run file listing the pipeline steps and their parameters.
    #[arg(long)]
    pub config: PathBuf,
    /// Number of in-process workers, overriding the run file.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Master seed, overriding the run file.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = RunConfig::load(&args.config)?;
    let base = args
        .config
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let registry = StepRegistry::builtin()?;
    let pipeline = PipelineBuilder::new(&registry).build(&config.step_names())?;
    let step_config = config.step_config()?;
    let cluster = LocalCluster::new(config.workers)?;
    info!(
        config = %args.config.display(),
        workers = cluster.size(),
        seed = config.seed,
        "starting run"
    );

    let tallies = cluster.run(|coordinator| {
        let mut rng = RngHandle::for_rank(config.seed, coordinator.rank());
        let mut env = StepEnv {
            coordinator,
            rng: &mut rng,
        };
        let mut context = Context::new();
        pipeline.run(&mut context, &step_config, &mut env)?;
        EntityTally::of(&context)
    })?;

    let mut tool_versions = BTreeMap::new();
    tool_versions.insert("hazimp".to_string(), env!("CARGO_PKG_VERSION").to_string());
    let summary = RunProvenance {
        input_hash: stable_hash_string(&config)?,
        seed: config.seed,
        workers: cluster.size(),
        steps: pipeline.step_names(),
        entities: Some(EntityTally::distinct(&tallies)),
        worker_entities: tallies.iter().map(|tally| tally.count).collect(),
        tool_versions,
        ..RunProvenance::default()
    };
    let summary_path = base.join("run_summary.json");
    fs::write(&summary_path, serde_json::to_vec_pretty(&summary)?)?;
    info!(summary = %summary_path.display(), "run finished");
    Ok(())
}

/// Entities one worker ended the run with.
struct EntityTally {
    count: usize,
    ids: Option<Vec<u64>>,
}

impl EntityTally {
    fn of(context: &Context) -> Result<Self, HazError> {
        let ids = context
            .attribute(INTID)
            .and_then(Column::as_floats)
            .map(|ids| ids.iter().map(|&id| id as u64).collect());
        Ok(Self {
            count: context.entity_count()?,
            ids,
        })
    }

    /// Distinct entity ids when every worker carries them, the plain sum otherwise.
    fn distinct(tallies: &[EntityTally]) -> usize {
        let mut seen = BTreeSet::new();
        for tally in tallies {
            match &tally.ids {
                Some(ids) => seen.extend(ids.iter().copied()),
                None => return tallies.iter().map(|tally| tally.count).sum(),
            }
        }
        seen.len()
    }
}
