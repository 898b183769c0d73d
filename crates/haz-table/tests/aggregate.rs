use haz_table::{aggregate, Agg, AggSpec, Column, Table};

fn sample() -> Table {
    let mut table = Table::new();
    table.insert(
        "suburb",
        Column::Text(vec!["b".into(), "a".into(), "b".into(), "a".into(), "c".into()]),
    );
    table.insert("loss", Column::Float(vec![1.0, 2.0, 3.0, 4.0, f64::NAN]));
    table
}

#[test]
fn groups_are_sorted_and_named_by_function() {
    let specs = vec![AggSpec {
        column: "loss".into(),
        aggs: vec![Agg::Sum, Agg::Mean, Agg::Count],
    }];
    let out = aggregate(&sample(), "suburb", &specs).expect("aggregate");
    let names: Vec<&str> = out.names().collect();
    assert_eq!(names, vec!["suburb", "loss_sum", "loss_mean", "loss_count"]);
    assert_eq!(
        out.get("suburb"),
        Some(&Column::Text(vec!["a".into(), "b".into(), "c".into()]))
    );
    let sums = out.get("loss_sum").and_then(Column::as_floats).unwrap();
    assert_eq!(sums, &[6.0, 4.0, 0.0]);
    let means = out.get("loss_mean").and_then(Column::as_floats).unwrap();
    assert_eq!(&means[..2], &[3.0, 2.0]);
    assert!(means[2].is_nan());
    let counts = out.get("loss_count").and_then(Column::as_floats).unwrap();
    assert_eq!(counts, &[2.0, 2.0, 0.0]);
}

#[test]
fn std_uses_sample_estimator() {
    let specs = vec![AggSpec {
        column: "loss".into(),
        aggs: vec![Agg::Std, Agg::Min, Agg::Max],
    }];
    let out = aggregate(&sample(), "suburb", &specs).expect("aggregate");
    let std = out.get("loss_std").and_then(Column::as_floats).unwrap();
    assert!((std[0] - 2.0f64.sqrt()).abs() < 1e-12);
    assert!(std[2].is_nan());
    assert_eq!(out.get("loss_min").and_then(Column::as_floats).unwrap()[0], 2.0);
    assert_eq!(out.get("loss_max").and_then(Column::as_floats).unwrap()[1], 3.0);
}

#[test]
fn unknown_columns_are_configuration_errors() {
    let err = aggregate(&sample(), "region", &[]).expect_err("missing groupby");
    assert_eq!(err.code(), "aggregate.missing_column");

    let specs = vec![AggSpec {
        column: "suburb".into(),
        aggs: vec![Agg::Sum],
    }];
    let err = aggregate(&sample(), "suburb", &specs).expect_err("text column");
    assert_eq!(err.code(), "aggregate.non_numeric");
}

#[test]
fn function_names_parse() {
    assert_eq!("MEAN".parse::<Agg>().unwrap(), Agg::Mean);
    assert_eq!("std".parse::<Agg>().unwrap(), Agg::Std);
    assert_eq!("median".parse::<Agg>().unwrap_err().code(), "aggregate.unknown_function");
}
