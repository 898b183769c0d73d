use std::path::Path;

use haz_core::errors::{ErrorInfo, HazError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("step", "load_csv_exposure")
        .with_context("reason", "example")
}

#[test]
fn configuration_error_surface() {
    let err = HazError::Configuration(sample_info("pipeline.unknown_step", "unknown step"));
    assert_eq!(err.code(), "pipeline.unknown_step");
    assert!(err.info().context.contains_key("step"));
    assert!(err.to_string().starts_with("configuration error: unknown step"));
}

#[test]
fn format_error_surface() {
    let err = HazError::Format(sample_info("raster.header", "bad header"));
    assert_eq!(err.info().code, "raster.header");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn distribution_error_surface() {
    let err = HazError::Distribution(sample_info("sampling.sum", "weights do not sum to 1"));
    assert_eq!(err.code(), "sampling.sum");
}

#[test]
fn data_integrity_error_surface() {
    let err = HazError::DataIntegrity(sample_info("context.length", "length mismatch"));
    assert_eq!(err.code(), "context.length");
}

#[test]
fn io_error_carries_path() {
    let err = HazError::io("table.open", Path::new("/tmp/missing.csv"), "not found");
    assert_eq!(err.code(), "table.open");
    assert_eq!(
        err.info().context.get("path").map(String::as_str),
        Some("/tmp/missing.csv")
    );
}

#[test]
fn display_lists_context_and_hint() {
    let info = ErrorInfo::new("x.y", "broken")
        .with_context("a", "1")
        .with_context("b", "2")
        .with_hint("fix it");
    assert_eq!(info.to_string(), "broken (code: x.y) | context: [a=1, b=2] | hint: fix it");
}

#[test]
fn outer_context_does_not_overwrite_inner() {
    let err = HazError::Format(sample_info("raster.header", "bad header"))
        .with_context("step", "load_raster")
        .with_context("rank", "1");
    assert_eq!(err.info().context["step"], "load_csv_exposure");
    assert_eq!(err.info().context["rank"], "1");
}
