//! Integration tests for the design-cli commands.

use std::path::{Path, PathBuf};

use clap::Parser;
use design_cli::{resolve_format, run, CliArgs, FileConfig, InspectReport};
use design_core::{Editor, ElementPatch, ElementVariant, Point, QualityRating, Size};
use design_renderer::ExportFormat;

/// Write a small banner scene (one rect, one image) and return its path.
fn write_banner(dir: &Path) -> PathBuf {
    let mut editor = Editor::default();
    editor.add_element(
        ElementVariant::Rect,
        Point::new(20.0, 20.0),
        Some(Size::new(200.0, 100.0)),
        &ElementPatch {
            fill: Some("#ff0000".to_string()),
            ..ElementPatch::default()
        },
    );
    editor.add_element(
        ElementVariant::Image,
        Point::new(600.0, 0.0),
        Some(Size::new(600.0, 300.0)),
        &ElementPatch {
            native_width: Some(600),
            native_height: Some(300),
            ..ElementPatch::default()
        },
    );

    let path = dir.join("banner.json");
    std::fs::write(&path, editor.serialize_scene().expect("serialize")).expect("write scene");
    path
}

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let args = CliArgs::try_parse_from(args)?;
    let mut out = Vec::new();
    run(args, &mut out)?;
    Ok(String::from_utf8(out).expect("utf8 output"))
}

// ============================================================================
// Inspect
// ============================================================================

#[test]
fn test_inspect_human_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scene = write_banner(dir.path());

    let output = run_args(&["design-cli", "inspect", scene.to_str().expect("path")])
        .expect("inspect");
    assert!(output.contains("Canvas: 1200x600"));
    assert!(output.contains("Elements: 2"));
    assert!(output.contains("rect: 1"));
    assert!(output.contains("image: 1"));
    assert!(output.contains("150 DPI"));
}

#[test]
fn test_inspect_json_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scene = write_banner(dir.path());

    let output = run_args(&[
        "design-cli",
        "inspect",
        "--json",
        scene.to_str().expect("path"),
    ])
    .expect("inspect");
    let value: serde_json::Value = serde_json::from_str(&output).expect("json report");
    assert_eq!(value["element_count"], 2);
    let images = value["images"].as_array().expect("images");
    assert_eq!(images.len(), 1);
    let dpi = images[0]["dpi"].as_f64().expect("dpi");
    assert!((dpi - 150.0).abs() < 1e-3);
}

#[test]
fn test_inspect_report_worst_rating() {
    let mut editor = Editor::default();
    assert_eq!(InspectReport::new(&editor, Vec::new()).worst_rating(), None);

    editor.add_element(
        ElementVariant::Image,
        Point::default(),
        Some(Size::new(1200.0, 600.0)),
        &ElementPatch {
            native_width: Some(300),
            native_height: Some(150),
            ..ElementPatch::default()
        },
    );
    let report = InspectReport::new(&editor, Vec::new());
    assert_eq!(report.worst_rating(), Some(QualityRating::Poor));
}

#[test]
fn test_inspect_missing_file_fails_with_context() {
    let err = run_args(&["design-cli", "inspect", "/no/such/scene.json"]).expect_err("missing");
    assert!(format!("{err:#}").contains("reading scene"));
}

// ============================================================================
// Normalize
// ============================================================================

#[test]
fn test_normalize_drops_unknown_and_is_stable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("messy.json");
    std::fs::write(
        &input,
        r#"{"version":1,"canvas":{"width":300,"height":150},"elements":[
            {"id":"7c9e6679-7425-40de-944b-e07fc1f90ae7","type":"circle","x":5,"y":5,"radius":12},
            {"id":"0f8fad5b-d9cb-469f-a165-70867728950e","type":"sparkle","x":0,"y":0}
        ]}"#,
    )
    .expect("write");
    let output = dir.path().join("clean.json");

    run_args(&[
        "design-cli",
        "normalize",
        input.to_str().expect("path"),
        "-o",
        output.to_str().expect("path"),
    ])
    .expect("normalize");

    let first = std::fs::read_to_string(&output).expect("read");
    assert!(!first.contains("sparkle"));
    assert!(first.contains("\"circle\""));

    let again = run_args(&["design-cli", "normalize", output.to_str().expect("path")])
        .expect("normalize again");
    assert_eq!(again, first);
}

#[test]
fn test_normalize_rejects_malformed_scene() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("broken.json");
    std::fs::write(&input, r#"{"elements": []}"#).expect("write");

    let err = run_args(&["design-cli", "normalize", input.to_str().expect("path")])
        .expect_err("malformed");
    assert!(format!("{err:#}").contains("loading scene"));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_png_from_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scene = write_banner(dir.path());
    let output = dir.path().join("banner.png");

    let message = run_args(&[
        "design-cli",
        "export",
        scene.to_str().expect("path"),
        "-o",
        output.to_str().expect("path"),
    ])
    .expect("export");
    assert!(message.starts_with("Wrote "));

    let bytes = std::fs::read(&output).expect("read png");
    assert_eq!(&bytes[..4], &[137, 80, 78, 71]);
}

#[test]
fn test_export_jpeg_with_config_file_scale() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scene = write_banner(dir.path());
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"export": {"scale": 0.5}, "editor": {"history_limit": 5}}"#)
        .expect("write config");
    let output = dir.path().join("banner.out");

    run_args(&[
        "design-cli",
        "--config",
        config.to_str().expect("path"),
        "export",
        scene.to_str().expect("path"),
        "-o",
        output.to_str().expect("path"),
        "--format",
        "jpeg",
    ])
    .expect("export");

    let bytes = std::fs::read(&output).expect("read jpeg");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_export_unknown_format_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scene = write_banner(dir.path());
    let output = dir.path().join("banner.gif");

    let err = run_args(&[
        "design-cli",
        "export",
        scene.to_str().expect("path"),
        "-o",
        output.to_str().expect("path"),
    ])
    .expect_err("gif unsupported");
    assert!(err.to_string().contains("unsupported output extension"));
    assert!(!output.exists());
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
fn test_resolve_format() {
    assert_eq!(
        resolve_format(None, Path::new("out.JPG")).expect("jpg"),
        ExportFormat::Jpeg
    );
    assert_eq!(
        resolve_format(Some("svg"), Path::new("out.png")).expect("explicit"),
        ExportFormat::Svg
    );
    assert!(resolve_format(None, Path::new("out")).is_err());
}

#[test]
fn test_file_config_defaults_without_path() {
    let config = FileConfig::load(None).expect("defaults");
    assert_eq!(config, FileConfig::default());
    assert_eq!(config.editor.history_limit, None);
}
