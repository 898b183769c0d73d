use std::error::Error;

use clap::Args;
use haz_pipeline::StepRegistry;

#[derive(Args, Debug)]
pub struct StepsArgs {
    /// Print the catalogue as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &StepsArgs) -> Result<(), Box<dyn Error>> {
    let registry = StepRegistry::builtin()?;
    if args.json {
        let listing: Vec<_> = registry
            .iter()
            .map(|step| {
                serde_json::json!({
                    "name": step.name(),
                    "kind": step.kind(),
                    "params": step.params(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    for step in registry.iter() {
        let optional: Vec<String> = step
            .params()
            .iter()
            .filter_map(|p| p.default.as_ref().map(|d| format!("{}={}", p.name, d)))
            .collect();
        println!(
            "{:<20} {:<5} required: [{}] optional: [{}]",
            step.name(),
            format!("{:?}", step.kind()).to_lowercase(),
            step.required_params().join(", "),
            optional.join(", "),
        );
    }
    Ok(())
}
