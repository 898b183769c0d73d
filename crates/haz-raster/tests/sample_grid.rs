use std::fs;
use std::path::PathBuf;

use haz_raster::{sample_sources, AsciiGrid};
use tempfile::{tempdir, TempDir};

const GRID: &str = "ncols 3\r\nnrows 2\r\nxllcorner +0.\r\nyllcorner +8.\r\ncellsize 1\r\nNODATA_value -9999\r\n1 2 -9999 \r\n4 5 6 \r\n";

fn write_grid(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("write grid");
    path
}

fn assert_samples(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (got, want) in actual.iter().zip(expected) {
        if want.is_nan() {
            assert!(got.is_nan(), "expected no value, got {got}");
        } else {
            assert!((got - want).abs() < 1e-12, "expected {want}, got {got}");
        }
    }
}

fn load_grid() -> (TempDir, AsciiGrid) {
    let dir = tempdir().expect("tempdir");
    let path = write_grid(&dir, "grid.asc", GRID);
    let grid = AsciiGrid::load(&path).expect("load");
    (dir, grid)
}

#[test]
fn header_is_parsed() {
    let (_dir, grid) = load_grid();
    let header = grid.header();
    assert_eq!((header.ncols, header.nrows), (3, 2));
    assert_eq!((header.xllcorner, header.yllcorner), (0.0, 8.0));
    assert_eq!(header.cellsize, 1.0);
    assert_eq!(header.nodata_value, Some(-9999.0));
}

#[test]
fn interior_points_take_the_nearest_cell() {
    let (_dir, grid) = load_grid();
    let values = grid
        .sample_points(&[0.0, 0.9, 1.999], &[9.9, 9.1, 8.9])
        .expect("sample");
    assert_samples(&values, &[1.0, 1.0, 5.0]);
}

#[test]
fn points_near_edges_and_no_data() {
    let (_dir, grid) = load_grid();
    let values = grid
        .sample_points(
            &[0.0001, 0.0001, 2.999, 2.999],
            &[8.0001, 9.999, 9.999, 8.0001],
        )
        .expect("sample");
    assert_samples(&values, &[4.0, 1.0, f64::NAN, 6.0]);
}

#[test]
fn points_outside_the_extent_have_no_value() {
    let (_dir, grid) = load_grid();
    let values = grid
        .sample_points(&[-0.0001, 1.5, 3.0001, 1.5], &[9.0, 10.00001, 9.0, 7.99999])
        .expect("sample");
    assert_samples(&values, &[f64::NAN; 4]);
}

#[test]
fn no_data_cell_has_no_value() {
    let (_dir, grid) = load_grid();
    assert!(grid.sample(2.0001, 9.000019).is_nan());
}

#[test]
fn cell_edges_follow_the_floor_rule() {
    let (_dir, grid) = load_grid();
    // an edge point belongs to the cell east or south of it
    assert_eq!(grid.sample(1.0, 9.5), 2.0);
    assert_eq!(grid.sample(0.5, 9.0), 4.0);
    assert_eq!(grid.sample(0.0, 10.0), 1.0);
    assert!(grid.sample(3.0, 9.5).is_nan());
    assert!(grid.sample(0.5, 8.0).is_nan());
}

#[test]
fn mismatched_coordinates_are_rejected() {
    let (_dir, grid) = load_grid();
    let err = grid.sample_points(&[0.0, 1.0], &[9.0]).expect_err("mismatch");
    assert_eq!(err.code(), "raster.coordinate_mismatch");
}

#[test]
fn first_source_with_a_value_wins() {
    let dir = tempdir().expect("tempdir");
    let first = write_grid(&dir, "first.asc", GRID);
    let second = write_grid(
        &dir,
        "second.asc",
        "ncols 4\nnrows 3\nxllcorner 0\nyllcorner 7\ncellsize 1\nNODATA_value -1\n10 20 30 40\n50 60 70 80\n90 -1 -1 -1\n",
    );
    let values = sample_sources(
        &[first, second],
        &[0.5, 2.5, 3.5, 0.5, 1.5, 20.0],
        &[9.5, 9.5, 9.5, 7.5, 7.5, 9.5],
    )
    .expect("sample");
    assert_samples(&values, &[1.0, 30.0, 40.0, 90.0, f64::NAN, f64::NAN]);
}

#[test]
fn later_sources_are_not_read_once_every_point_resolves() {
    let dir = tempdir().expect("tempdir");
    let first = write_grid(&dir, "first.asc", GRID);
    let missing = dir.path().join("never-written.asc");
    let values = sample_sources(&[first, missing], &[0.5], &[9.5]).expect("sample");
    assert_eq!(values, vec![1.0]);
}

#[test]
fn missing_source_is_io_error() {
    let dir = tempdir().expect("tempdir");
    let err = sample_sources(&[dir.path().join("absent.asc")], &[0.5], &[9.5])
        .expect_err("missing");
    assert_eq!(err.code(), "raster.open");
    assert!(err.info().context["path"].ends_with("absent.asc"));
}
