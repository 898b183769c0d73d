use haz_table::{read_bundle, write_bundle, Column, Table};
use tempfile::tempdir;

#[test]
fn bundle_keeps_vectors_and_missing_values() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("result.json");
    let mut table = Table::new();
    table.insert("shoes", Column::Float(vec![10.0, f64::NAN]));
    table.insert(
        "depth",
        Column::from_rows(vec![vec![5.0, 3.0], vec![2.0, 4.0]]).expect("rows"),
    );
    table.insert("name", Column::Text(vec!["a".into(), "b".into()]));

    write_bundle(&table, &path).expect("write");
    let restored = read_bundle(&path).expect("read");

    let names: Vec<&str> = restored.names().collect();
    assert_eq!(names, vec!["shoes", "depth", "name"]);
    let shoes = restored.get("shoes").and_then(Column::as_floats).unwrap();
    assert_eq!(shoes[0], 10.0);
    assert!(shoes[1].is_nan());
    assert_eq!(restored.get("depth"), table.get("depth"));
    assert_eq!(restored.get("name"), table.get("name"));
}

#[test]
fn corrupt_bundle_is_format_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, b"{not json").expect("write");
    assert_eq!(read_bundle(&path).unwrap_err().code(), "bundle.decode");
}
