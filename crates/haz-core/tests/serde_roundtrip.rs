use haz_core::errors::{ErrorInfo, HazError};
use haz_core::provenance::{stable_hash_string, RunProvenance, SchemaVersion};

#[test]
fn provenance_round_trip_json() {
    let provenance = RunProvenance {
        schema_version: SchemaVersion::new(1, 0, 0),
        input_hash: "input".into(),
        seed: 99,
        workers: 2,
        steps: vec!["load_csv_exposure".into(), "save_exposure".into()],
        entities: Some(10),
        worker_entities: vec![5, 5],
        tool_versions: [("haz-core".into(), "0.1.0".into())].into_iter().collect(),
    };

    let json = serde_json::to_string_pretty(&provenance).expect("serialize");
    let decoded: RunProvenance = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, provenance);
}

#[test]
fn errors_round_trip_json() {
    let err = HazError::Format(ErrorInfo::new("table.shape", "3d column").with_context("column", "A"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Format\""));
    let decoded: HazError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn stable_hash_is_repeatable() {
    let a = stable_hash_string(&("config", 1u64)).expect("hash");
    let b = stable_hash_string(&("config", 1u64)).expect("hash");
    let c = stable_hash_string(&("config", 2u64)).expect("hash");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
}
