use haz_core::errors::HazError;
use haz_pipeline::steps::{ADD, LOAD_CSV_EXPOSURE, SAVE_EXPOSURE};
use haz_pipeline::{
    Context, ParamSpec, StepArgs, StepDescriptor, StepEnv, StepKind, StepRegistry,
};
use serde_json::json;

fn noop(_: &mut Context, _: &StepArgs, _: &mut StepEnv<'_>) -> Result<(), HazError> {
    Ok(())
}

#[test]
fn parameters_split_in_declaration_order() {
    let step = StepDescriptor::new(
        "mixed",
        StepKind::Calc,
        vec![
            ParamSpec::required("a"),
            ParamSpec::optional("b", 1.0),
            ParamSpec::required("c"),
            ParamSpec::optional("d", "x"),
        ],
        noop,
    )
    .expect("descriptor");
    assert_eq!(step.required_params(), ["a", "c"]);
    assert_eq!(step.optional_params(), ["b", "d"]);
    let declared: Vec<&str> = step.params().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(declared, vec!["a", "b", "c", "d"]);
    assert_eq!(step.param("d").and_then(|p| p.default.clone()), Some(json!("x")));
}

#[test]
fn step_without_parameters_has_empty_lists() {
    let step = StepDescriptor::new("bare", StepKind::Job, Vec::new(), noop).expect("descriptor");
    assert!(step.required_params().is_empty());
    assert!(step.optional_params().is_empty());
    assert!(!step.accepts_extra());
    assert!(step.accepting_extra().accepts_extra());
}

#[test]
fn duplicate_parameter_is_rejected() {
    let err = StepDescriptor::new(
        "twice",
        StepKind::Calc,
        vec![ParamSpec::required("a"), ParamSpec::optional("a", 2.0)],
        noop,
    )
    .expect_err("duplicate param");
    assert!(matches!(err, HazError::Configuration(_)));
    assert_eq!(err.code(), "registry.duplicate_param");
}

#[test]
fn duplicate_step_name_fails_at_registration() {
    let mut registry = StepRegistry::builtin().expect("builtin");
    let clash = StepDescriptor::new(ADD, StepKind::Calc, Vec::new(), noop).expect("descriptor");
    let err = registry.register(clash).expect_err("duplicate");
    assert_eq!(err.code(), "registry.duplicate_step");
    assert_eq!(err.info().context["step"], ADD);
}

#[test]
fn builtin_catalogue() {
    let registry = StepRegistry::builtin().expect("builtin");
    let names: Vec<&str> = registry.iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec![
            "load_csv_exposure",
            "load_raster",
            "constant",
            "add",
            "mult",
            "weighted_category",
            "permutate_exposure",
            "save_exposure",
            "save_aggregation",
        ]
    );

    let load = registry.get(LOAD_CSV_EXPOSURE).expect("load step");
    assert_eq!(load.kind(), StepKind::Job);
    assert_eq!(load.required_params(), ["file_name"]);
    assert_eq!(
        load.optional_params(),
        ["exposure_latitude", "exposure_longitude", "use_parallel"]
    );

    let save = registry.get(SAVE_EXPOSURE).expect("save step");
    assert_eq!(save.param("use_parallel").and_then(|p| p.default.clone()), Some(json!(true)));
    assert!(!registry.contains("load_xml_exposure"));
}
